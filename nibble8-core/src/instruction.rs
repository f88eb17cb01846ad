use nibble8_macros::Mnemonic;

use crate::Opcode;

/// A decoded instruction. Register operands are register indices, not values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Mnemonic)]
pub enum Instruction {
    #[mnemonic("CLS")]
    Clear,
    #[mnemonic("RET")]
    Return,
    #[mnemonic("JP {nnn:#05X}")]
    Jump { nnn: u16 },
    #[mnemonic("CALL {nnn:#05X}")]
    Call { nnn: u16 },
    #[mnemonic("SE V{x:X}, {kk:#04X}")]
    SkipIfEqualByte { x: u8, kk: u8 },
    #[mnemonic("SNE V{x:X}, {kk:#04X}")]
    SkipIfNotEqualByte { x: u8, kk: u8 },
    #[mnemonic("SE V{x:X}, V{y:X}")]
    SkipIfEqual { x: u8, y: u8 },
    #[mnemonic("SNE V{x:X}, V{y:X}")]
    SkipIfNotEqual { x: u8, y: u8 },
    #[mnemonic("LD V{x:X}, {kk:#04X}")]
    LoadByte { x: u8, kk: u8 },
    #[mnemonic("ADD V{x:X}, {kk:#04X}")]
    AddByte { x: u8, kk: u8 },
    #[mnemonic("LD V{x:X}, V{y:X}")]
    Load { x: u8, y: u8 },
    #[mnemonic("OR V{x:X}, V{y:X}")]
    Or { x: u8, y: u8 },
    #[mnemonic("AND V{x:X}, V{y:X}")]
    And { x: u8, y: u8 },
    #[mnemonic("XOR V{x:X}, V{y:X}")]
    Xor { x: u8, y: u8 },
    #[mnemonic("ADD V{x:X}, V{y:X}")]
    Add { x: u8, y: u8 },
    #[mnemonic("SUB V{x:X}, V{y:X}")]
    Sub { x: u8, y: u8 },
    #[mnemonic("SHR V{x:X}, V{y:X}")]
    ShiftRight { x: u8, y: u8 },
    #[mnemonic("SUBN V{x:X}, V{y:X}")]
    SubReversed { x: u8, y: u8 },
    #[mnemonic("SHL V{x:X}, V{y:X}")]
    ShiftLeft { x: u8, y: u8 },
    #[mnemonic("LD I, {nnn:#05X}")]
    LoadIndex { nnn: u16 },
    #[mnemonic("JP V0, {nnn:#05X}")]
    OffsetByV0 { nnn: u16 },
    #[mnemonic("RND V{x:X}, {kk:#04X}")]
    Random { x: u8, kk: u8 },
    #[mnemonic("DRW V{x:X}, V{y:X}, {n}")]
    Draw { x: u8, y: u8, n: u8 },
    #[mnemonic("SKP V{x:X}")]
    SkipIfKey { x: u8 },
    #[mnemonic("SKNP V{x:X}")]
    SkipIfNotKey { x: u8 },
    #[mnemonic("LD V{x:X}, DT")]
    LoadDelay { x: u8 },
    #[mnemonic("LD V{x:X}, K")]
    WaitKey { x: u8 },
    #[mnemonic("LD DT, V{x:X}")]
    SetDelay { x: u8 },
    #[mnemonic("LD ST, V{x:X}")]
    SetSound { x: u8 },
    #[mnemonic("ADD I, V{x:X}")]
    AddIndex { x: u8 },
    #[mnemonic("LD F, V{x:X}")]
    Glyph { x: u8 },
    #[mnemonic("LD B, V{x:X}")]
    Bcd { x: u8 },
    #[mnemonic("LD [I], V{x:X}")]
    StoreRegisters { x: u8 },
    #[mnemonic("LD V{x:X}, [I]")]
    LoadRegisters { x: u8 },
    #[mnemonic("DW {word:#06X}")]
    Unknown { word: u16 },
}

impl Instruction {
    /// Decodes a word in a single pass. Words matching no pattern decode to
    /// [`Instruction::Unknown`]; whether that is an error is up to the caller.
    pub fn decode(opcode: Opcode) -> Self {
        use Instruction::*;

        let (x, y, n) = (opcode.x(), opcode.y(), opcode.n());
        let kk = opcode.kk();
        let nnn = opcode.nnn();

        match [opcode.nibble(1), x, y, n] {
            [0x0, 0x0, 0xE, 0x0] => Clear,
            [0x0, 0x0, 0xE, 0xE] => Return,
            [0x1, _, _, _] => Jump { nnn },
            [0x2, _, _, _] => Call { nnn },
            [0x3, _, _, _] => SkipIfEqualByte { x, kk },
            [0x4, _, _, _] => SkipIfNotEqualByte { x, kk },
            [0x5, _, _, 0x0] => SkipIfEqual { x, y },
            [0x6, _, _, _] => LoadByte { x, kk },
            [0x7, _, _, _] => AddByte { x, kk },
            [0x8, _, _, 0x0] => Load { x, y },
            [0x8, _, _, 0x1] => Or { x, y },
            [0x8, _, _, 0x2] => And { x, y },
            [0x8, _, _, 0x3] => Xor { x, y },
            [0x8, _, _, 0x4] => Add { x, y },
            [0x8, _, _, 0x5] => Sub { x, y },
            [0x8, _, _, 0x6] => ShiftRight { x, y },
            [0x8, _, _, 0x7] => SubReversed { x, y },
            [0x8, _, _, 0xE] => ShiftLeft { x, y },
            [0x9, _, _, 0x0] => SkipIfNotEqual { x, y },
            [0xA, _, _, _] => LoadIndex { nnn },
            [0xB, _, _, _] => OffsetByV0 { nnn },
            [0xC, _, _, _] => Random { x, kk },
            [0xD, _, _, _] => Draw { x, y, n },
            [0xE, _, 0x9, 0xE] => SkipIfKey { x },
            [0xE, _, 0xA, 0x1] => SkipIfNotKey { x },
            [0xF, _, 0x0, 0x7] => LoadDelay { x },
            [0xF, _, 0x0, 0xA] => WaitKey { x },
            [0xF, _, 0x1, 0x5] => SetDelay { x },
            [0xF, _, 0x1, 0x8] => SetSound { x },
            [0xF, _, 0x1, 0xE] => AddIndex { x },
            [0xF, _, 0x2, 0x9] => Glyph { x },
            [0xF, _, 0x3, 0x3] => Bcd { x },
            [0xF, _, 0x5, 0x5] => StoreRegisters { x },
            [0xF, _, 0x6, 0x5] => LoadRegisters { x },
            _ => Unknown { word: opcode.0 },
        }
    }
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Self::decode(Opcode(word))
    }
}
