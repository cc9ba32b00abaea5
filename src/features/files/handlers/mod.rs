pub mod file_handler;

pub use file_handler::{
    __path_delete_file, __path_get_file, __path_list_files, __path_rename_file,
    __path_upload_file, delete_file, get_file, list_files, rename_file, upload_file,
};
