//! Archive acquisition
//!
//! External-facing plumbing for getting archives onto disk:
//!
//! - `download`: HTTP streaming download and gzip extraction
//! - `listing`: lazy key iteration over a paths manifest
//!
//! Everything here fails fatally; retries and partial-failure policy belong
//! to whoever schedules the job, not the pipeline.

mod download;
mod listing;

pub use download::{
    build_http_client, download_archive, file_name_from_url, remove_source, DownloadedArchive,
};
pub use listing::ArchiveList;
