pub mod error;
pub mod filter;
pub mod live;
pub mod ops;
pub mod ordering;
pub mod projection;
pub mod reconciler;
pub mod resolver;
pub mod selection;
pub mod view;

pub use error::SyncError;
pub use live::LiveList;
pub use ops::{Coordinate, PerSurface, Surface, ViewOp};
pub use ordering::Section;
pub use projection::{Projection, RecordSource};
pub use reconciler::Reconciler;
pub use selection::{Selected, SelectionTracker};
pub use view::{DataSource, MirrorView, Recorder, ViewAdapter};
