pub mod file_dto;

pub use file_dto::{
    content_disposition, file_location, FileSummaryDto, RenameFileQuery, UploadFileDto,
    VideoFormat, FILES_PATH, UPLOAD_FIELD,
};
