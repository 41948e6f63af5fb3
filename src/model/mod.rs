mod entry;
mod ids;
mod state;

pub use self::entry::{Action, ActionChange, BaseEntry, Entry, EntryKind};
pub use self::ids::EntryId;
pub use self::state::{Author, PlanState, PlanStatus};
