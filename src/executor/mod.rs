pub mod assembler;
pub mod gate;
pub mod runner;

pub use assembler::CommandAssembler;
pub use gate::{Authorization, ConfirmInput, ExecutionGate, LineConfirm, TerminalConfirm};
pub use runner::CommandRunner;
