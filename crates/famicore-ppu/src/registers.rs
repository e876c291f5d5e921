//! CPU-visible PPU registers (PPUCTRL, PPUMASK, PPUSTATUS) and sprite
//! attribute bits.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000), write only.
    ///
    /// ```text
    /// 7  bit  0
    /// VPHB SINN
    /// |||| ||++- base nametable select
    /// |||| |+--- VRAM increment (0: +1, 1: +32)
    /// |||| +---- sprite pattern table (8x8 mode)
    /// |||+------ background pattern table
    /// ||+------- sprite size (stored, 8x16 not implemented)
    /// |+-------- master/slave (unused)
    /// +--------- NMI at vblank
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuCtrl: u8 {
        /// Nametable select, low bit.
        const NAMETABLE_X = 0b0000_0001;
        /// Nametable select, high bit.
        const NAMETABLE_Y = 0b0000_0010;
        /// VRAM address increment: 1 across, 32 down.
        const VRAM_INCREMENT = 0b0000_0100;
        /// Sprite pattern table at $1000.
        const SPRITE_TABLE = 0b0000_1000;
        /// Background pattern table at $1000.
        const BG_TABLE = 0b0001_0000;
        /// 8x16 sprite mode (stored only in this core).
        const SPRITE_SIZE = 0b0010_0000;
        /// Master/slave select, unused on the NES.
        const MASTER_SLAVE = 0b0100_0000;
        /// Raise NMI when the vblank flag sets.
        const NMI_ENABLE = 0b1000_0000;
    }
}

impl PpuCtrl {
    /// VRAM address increment applied by $2007 accesses.
    #[inline]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    /// Sprite pattern table base for 8x8 sprites.
    #[inline]
    pub fn sprite_table_addr(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Background pattern table base.
    #[inline]
    pub fn bg_table_addr(self) -> u16 {
        if self.contains(Self::BG_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// NMI generation enabled.
    #[inline]
    pub fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// PPUMASK ($2001), write only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuMask: u8 {
        /// Greyscale output (stored only in this core).
        const GREYSCALE = 0b0000_0001;
        /// Show background in the leftmost 8 pixels.
        const SHOW_BG_LEFT = 0b0000_0010;
        /// Show sprites in the leftmost 8 pixels.
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        /// Background enable.
        const SHOW_BG = 0b0000_1000;
        /// Sprite enable.
        const SHOW_SPRITES = 0b0001_0000;
        /// Emphasize red (stored only).
        const EMPHASIZE_RED = 0b0010_0000;
        /// Emphasize green (stored only).
        const EMPHASIZE_GREEN = 0b0100_0000;
        /// Emphasize blue (stored only).
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl PpuMask {
    /// Rendering is enabled when either layer is shown.
    #[inline]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BG | Self::SHOW_SPRITES)
    }

    /// Background layer enabled.
    #[inline]
    pub fn show_background(self) -> bool {
        self.contains(Self::SHOW_BG)
    }

    /// Sprite layer enabled.
    #[inline]
    pub fn show_sprites(self) -> bool {
        self.contains(Self::SHOW_SPRITES)
    }

    /// Background visible in the left column.
    #[inline]
    pub fn show_bg_left(self) -> bool {
        self.contains(Self::SHOW_BG_LEFT)
    }

    /// Sprites visible in the left column.
    #[inline]
    pub fn show_sprites_left(self) -> bool {
        self.contains(Self::SHOW_SPRITES_LEFT)
    }
}

bitflags! {
    /// PPUSTATUS ($2002), read only. Bits 4-0 float to open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuStatus: u8 {
        /// More than 8 sprites landed on a scanline.
        const SPRITE_OVERFLOW = 0b0010_0000;
        /// Sprite 0 overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// In vertical blank.
        const VBLANK = 0b1000_0000;
    }
}

bitflags! {
    /// Sprite attribute byte (OAM byte 2). Bits 2-4 do not exist in
    /// hardware OAM and read back as zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SpriteAttributes: u8 {
        /// Sprite palette, low bit.
        const PALETTE_0 = 0b0000_0001;
        /// Sprite palette, high bit.
        const PALETTE_1 = 0b0000_0010;
        /// Behind the background when set.
        const PRIORITY = 0b0010_0000;
        /// Horizontal flip.
        const FLIP_H = 0b0100_0000;
        /// Vertical flip.
        const FLIP_V = 0b1000_0000;
    }
}

impl SpriteAttributes {
    /// Palette index in the sprite bank (4-7).
    #[inline]
    pub fn palette(self) -> u8 {
        (self.bits() & 0x03) + 4
    }

    /// Sprite renders behind opaque background.
    #[inline]
    pub fn behind_background(self) -> bool {
        self.contains(Self::PRIORITY)
    }
}
