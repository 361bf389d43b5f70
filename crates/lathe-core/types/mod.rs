mod error;
mod grammar;
mod instruction;
mod interval;
mod machine;
mod storage;
mod tree;

pub use error::{LatheError, LatheResult};
pub use grammar::{Action, Base, Call, Capture, Grammar, Pattern, Selector, State};
pub use instruction::{Check, Consumer, Instruction};
pub use interval::{Bitmap, Interval, Range};
pub use machine::{Inst, Machine};
pub use storage::{CallbackDef, PropId, Storage, Typ};
pub use tree::{Branches, CharBranch, LiteralBranch, Next, SpecAction, Step, Tree};
