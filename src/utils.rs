use std::path::PathBuf;

/// Get snapshot data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("NSIGNALS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get artifact output directory from environment variable or use default
pub fn get_out_dir() -> PathBuf {
    std::env::var("NSIGNALS_OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("public"))
}
