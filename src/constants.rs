/// Marker written by the extractor when a row has no `<img>`; replaced by the transformer.
pub const NO_IMAGE_SENTINEL: &str = "NO_IMAGE";

/// Placeholder image substituted for rows without a picture.
pub const NO_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/0/0a/No-image-available.png/480px-No-image-available.png";

/// Scheme prepended to image `src` attributes.
pub const DEFAULT_IMAGE_PREFIX: &str = "https://";

/// Class markers the target table must carry (sortable, sticky header).
pub const DEFAULT_TABLE_CLASSES: [&str; 2] = ["sortable", "sticky-header"];

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

pub const DEFAULT_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_association_football_stadiums_by_capacity";

// Storage defaults
pub const DEFAULT_CONTAINER: &str = "dateng";
pub const DEFAULT_BLOB_PREFIX: &str = "data";
pub const DEFAULT_FS_ROOT: &str = "output";
pub const DEFAULT_CONNECTION_STRING_ENV: &str = "STADIUM_ETL_STORAGE_CONNECTION_STRING";
pub const BLOB_NAME_STEM: &str = "stadium_cleaned";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Key under which stage payloads are exchanged in scheduled-task mode.
pub const HANDOFF_KEY: &str = "rows";

/// Column order of the written CSV.
pub const CSV_HEADERS: [&str; 8] = [
    "rank",
    "stadium",
    "capacity",
    "region",
    "country",
    "city",
    "images",
    "home_team",
];
