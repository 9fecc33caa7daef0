use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn settings_export() {
    print!("{}", seashell_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        seashell_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: detect.sample_chars={}, format.sample_lines={}, index.extension={}, index.verify_checksum={}",
        s.detect.sample_chars, s.format.sample_lines, s.index.extension, s.index.verify_checksum
    );
}

/// Install a custom settings file before any dictionary is opened.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(
        seashell_core::settings::init_custom(content),
        "Error in {file}: {}"
    );
}
