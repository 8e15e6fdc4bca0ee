pub(crate) const PARTIAL_SUFFIX: &str = ".part";

pub(crate) const SEPARATOR_LINE: &str = "-------------------------------------------------";

pub(crate) const ENTRY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub(crate) const SNAPSHOT_TIME_FORMAT: &str = "%H:%M:%S";
pub(crate) const LOG_TIME_FORMAT: &str = "%H:%M:%S";

// Same width as a time and size column so names line up with found rows.
pub(crate) const NOT_FOUND_PLACEHOLDER: &str = "                |        |";

pub(crate) const SIZE_UNITS: [char; 7] = [' ', 'K', 'M', 'G', 'T', 'P', 'E'];
pub(crate) const SIZE_ERROR: &str = "#err size<0";
