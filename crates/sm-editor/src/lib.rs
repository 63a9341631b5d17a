pub mod commands;
pub mod debounce;
pub mod editors;
pub mod guard;
pub mod hit;
pub mod input;
pub mod inputs;
pub mod manip;
pub mod sync;
pub mod tree;

pub use commands::{GeneratedImage, NewFolder, Pattern, ViewStep, rename_by_type};
pub use editors::{EditorHost, EditorRegistry, LOAD_UI_EVENT, PanelHandle};
pub use input::InputEvent;
pub use inputs::{InputRow, InputsList};
pub use manip::{EditNodePair, TransformManip};
pub use sync::{DropAction, NavState, SessionManager, VIEW_MARK};
pub use tree::{Icon, ItemFlags, ItemId, ItemKind, NodePath, TreeItem, TreeModel};
