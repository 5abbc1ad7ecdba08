mod record;
mod writer;

pub use record::{save_depth_export, save_fusion_metadata, DepthExport, FusionRecord};
pub use writer::{fused_frame_writer, WriterSettings};
