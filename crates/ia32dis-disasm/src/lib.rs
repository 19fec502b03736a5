//! # ia32dis-disasm
//!
//! Table-driven decoder for IA-32 (32-bit x86) machine code.
//!
//! The decoder walks a byte buffer and hands each instruction, with its
//! program counter, to an [`InstructionVisitor`]. Instructions are built by an
//! [`InstructionFactory`]; [`DefaultFactory`] produces
//! [`ia32dis_core::Instruction`] values.
//!
//! ```
//! use ia32dis_disasm::{DecoderConfig, Ia32Disassembler};
//!
//! let disasm = Ia32Disassembler::with_config(DecoderConfig::new().with_start_pc(0x1000));
//! let code = [0x55, 0x89, 0xe5, 0xc3];
//! let text: Vec<String> = disasm
//!     .disassemble(&code)
//!     .unwrap()
//!     .iter()
//!     .map(|(_, insn)| insn.to_string())
//!     .collect();
//! assert_eq!(text, ["pushl %ebp", "movl %esp,%ebp", "ret"]);
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod traits;

#[cfg(feature = "ia32")]
pub mod ia32;

pub use config::{DecoderConfig, TruncationPolicy};
pub use error::DecodeError;
pub use factory::DefaultFactory;
pub use traits::{
    DecodedInstruction, Disassembler, InstructionFactory, InstructionInfo, InstructionVisitor,
    StreamSummary,
};

#[cfg(feature = "ia32")]
pub use ia32::Ia32Disassembler;
