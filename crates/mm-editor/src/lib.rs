pub mod clock;
pub mod config;
pub mod gesture;
pub mod history;
pub mod input;
pub mod schedule;
pub mod session;
pub mod shortcuts;
pub mod storage;
pub mod toolbar;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EditorConfig;
pub use gesture::{GestureEffect, GestureMode, GestureState, GestureTracker};
pub use history::{HistoryLog, HistoryManager, HistoryPhase, Recovery};
pub use input::{InputEvent, TouchPoint, Touches};
pub use session::{EditorSession, SceneMutation, TickOutcome};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use storage::{MemoryStore, RecoveryStore, StorageError};
pub use toolbar::{Panel, TextControls, ToolbarEdit, ToolbarState};
