use std::fs;
use std::path::Path;
use std::process;

use serde::Serialize;

use seashell_core::{Dictionary, SearchMode};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

fn open(dict_file: &str) -> Dictionary {
    die!(
        Dictionary::load(Path::new(dict_file)),
        "Error opening dictionary {dict_file}: {}"
    )
}

fn build(dict: &Dictionary) {
    let stats = die!(dict.build_index(), "Error building index: {}");
    eprintln!(
        "Indexed {} lines ({} skipped), {} anchors",
        stats.lines, stats.skipped_lines, stats.anchors
    );
}

pub fn index(dict_file: &str) {
    let dict = open(dict_file);
    eprintln!("Building index for {dict_file} ({})...", dict.encoding());
    build(&dict);

    if let Some(index_path) = dict.index_path() {
        let size = fs::metadata(index_path).map(|m| m.len()).unwrap_or(0);
        println!("Index: {} ({size} bytes)", index_path.display());
    }
}

pub struct SearchOptions {
    pub mode: SearchMode,
    pub limit: Option<usize>,
    pub json: bool,
}

#[derive(Serialize)]
struct SearchHit<'a> {
    offset: usize,
    entry: &'a str,
}

pub fn search(dict_file: &str, query: &str, opts: &SearchOptions) {
    let dict = open(dict_file);
    if !dict.has_index() {
        eprintln!("No index for {dict_file}, building...");
        build(&dict);
    }
    let searcher = die!(dict.searcher(), "Error: {}");
    let results = searcher.search(query);

    let mut shown = 0usize;
    for offset in results.iter(opts.mode).take(opts.limit.unwrap_or(usize::MAX)) {
        let entry = dict.read_entry(offset);
        if opts.json {
            let hit = SearchHit {
                offset,
                entry: &entry,
            };
            println!("{}", die!(serde_json::to_string(&hit), "Error: {}"));
        } else {
            println!("{entry}");
        }
        shown += 1;
    }
    eprintln!(
        "{shown} entries ({} anchors matched, mode {})",
        results.len(),
        opts.mode
    );
}

pub fn info(dict_file: &str) {
    let dict = open(dict_file);

    println!("Dictionary: {dict_file}");
    println!("Encoding:   {}", dict.encoding());
    println!("File size:  {:.1} MB", dict.len() as f64 / 1_048_576.0);
    match (dict.index(), dict.index_path()) {
        (Some(index), Some(path)) => {
            println!("Index:      {} ({} anchors)", path.display(), index.len())
        }
        (Some(index), None) => println!("Index:      in memory ({} anchors)", index.len()),
        (None, _) => println!("Index:      none"),
    }
}
