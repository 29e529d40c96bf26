pub mod facade;
pub mod history;

pub use facade::{NavigationError, NavigationHandle, Navigator};
pub use history::{History, Location, MemoryHistory, NavigationState};
