mod upload_store;

pub use upload_store::{
    is_mp3, title_from_file_name, PendingUpload, StoredUpload, UploadError, UploadStore,
    DEFAULT_MAX_UPLOAD_BYTES, UPLOADS_DIR_NAME, UPLOADS_URL_PREFIX, UPLOAD_STAGING_DIR_NAME,
};
