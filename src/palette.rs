#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Named entry in the shared palette. Every mapping table refers to colours by
/// ink name; the concrete values live in one `Palette` passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ink {
    Bg,
    Surface,
    SurfaceRaised,
    Border,
    Accent,
    Amber,
    AmberLight,
    Text,
    TextMuted,
    TextSubtle,
    // Radial clearing gradient around revealed content, inner to outer.
    Veil1,
    Veil2,
    Veil3,
    Veil4,
    Veil5,
}

impl Ink {
    pub const COUNT: usize = 15;

    pub const ALL: [Ink; Ink::COUNT] = [
        Ink::Bg,
        Ink::Surface,
        Ink::SurfaceRaised,
        Ink::Border,
        Ink::Accent,
        Ink::Amber,
        Ink::AmberLight,
        Ink::Text,
        Ink::TextMuted,
        Ink::TextSubtle,
        Ink::Veil1,
        Ink::Veil2,
        Ink::Veil3,
        Ink::Veil4,
        Ink::Veil5,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Immutable ordered colour set, constructed once and passed into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    table: [Rgb; Ink::COUNT],
}

impl Palette {
    /// The catalogue's warm phosphor palette.
    pub fn catalogue() -> Self {
        let mut table = [Rgb::new(0, 0, 0); Ink::COUNT];
        table[Ink::Bg.index()] = Rgb::new(0x1C, 0x18, 0x14);
        table[Ink::Surface.index()] = Rgb::new(0x1F, 0x1B, 0x16);
        table[Ink::SurfaceRaised.index()] = Rgb::new(0x25, 0x20, 0x19);
        table[Ink::Border.index()] = Rgb::new(0x33, 0x2D, 0x24);
        table[Ink::Accent.index()] = Rgb::new(0xE8, 0x6A, 0x3A);
        table[Ink::Amber.index()] = Rgb::new(0xD4, 0xA5, 0x6A);
        table[Ink::AmberLight.index()] = Rgb::new(0xC4, 0xA8, 0x6C);
        table[Ink::Text.index()] = Rgb::new(0xE8, 0xE0, 0xD0);
        table[Ink::TextMuted.index()] = Rgb::new(0xB8, 0xA8, 0x98);
        table[Ink::TextSubtle.index()] = Rgb::new(0x8A, 0x7E, 0x6E);
        table[Ink::Veil1.index()] = Rgb::new(0x25, 0x20, 0x19);
        table[Ink::Veil2.index()] = Rgb::new(0x2D, 0x27, 0x20);
        table[Ink::Veil3.index()] = Rgb::new(0x3A, 0x32, 0x28);
        table[Ink::Veil4.index()] = Rgb::new(0x4D, 0x44, 0x38);
        table[Ink::Veil5.index()] = Rgb::new(0x6A, 0x60, 0x50);
        Self { table }
    }

    pub fn rgb(&self, ink: Ink) -> Rgb {
        self.table[ink.index()]
    }
}

/// Ink for the graduated clearing around revealed content: near-invisible next
/// to a group, back to normal noise beyond five cells.
pub fn veil_for_distance(dist: f32) -> Ink {
    if dist < 1.0 {
        Ink::Veil1
    } else if dist < 2.0 {
        Ink::Veil2
    } else if dist < 3.0 {
        Ink::Veil3
    } else if dist < 4.0 {
        Ink::Veil4
    } else if dist < 5.0 {
        Ink::Veil5
    } else {
        Ink::TextSubtle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ink_indices_are_dense_and_unique() {
        for (i, ink) in Ink::ALL.iter().enumerate() {
            assert_eq!(ink.index(), i);
        }
    }

    #[test]
    fn veil_brightens_with_distance() {
        let palette = Palette::catalogue();
        let mut last = 0u32;
        for dist in [0.5, 1.5, 2.5, 3.5, 4.5, 6.0] {
            let rgb = palette.rgb(veil_for_distance(dist));
            let luma = rgb.r as u32 + rgb.g as u32 + rgb.b as u32;
            assert!(luma >= last, "veil got darker at distance {dist}");
            last = luma;
        }
    }
}
