/// Artifact transfer: streaming downloads and archive extraction
mod archive;
mod download;

pub use archive::extract_member;
pub use download::fetch;
