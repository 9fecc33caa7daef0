use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use seashell_core::codec::Encoding;
use seashell_core::index::build_index;
use seashell_core::{Dictionary, SearchMode};

const HEADWORDS: &[(&str, &str, &str)] = &[
    ("食べる", "たべる", "to eat/to devour"),
    ("本", "ほん", "book/main"),
    ("本屋", "ほんや", "bookstore/bookshop"),
    ("天気", "てんき", "weather"),
    ("今日", "きょう", "today/this day"),
    ("漢字", "かんじ", "Chinese characters/kanji"),
    ("犬", "いぬ", "dog"),
    ("猫", "ねこ", "cat"),
    ("家", "いえ", "house/home"),
    ("走る", "はしる", "to run/to dash"),
];

/// A few thousand lines built from the seed entries with numbered glosses so
/// that terms do not collapse into one run.
fn bench_text(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        let (head, reading, gloss) = HEADWORDS[i % HEADWORDS.len()];
        text.push_str(&format!("{head}{i} [{reading}] /{gloss}/variant{i} (n)/\n"));
    }
    text
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/build");
    for lines in [1_000usize, 10_000] {
        let text = bench_text(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| build_index(text.as_bytes(), Encoding::Utf8.codec()));
        });
    }
    group.finish();
}

static QUERIES: &[(&str, &str)] = &[
    ("kanji", "本"),
    ("kana", "ほん"),
    ("katakana", "ホン"),
    ("latin", "book"),
    ("miss", "zzz"),
];

fn bench_search(c: &mut Criterion) {
    let dict = Dictionary::from_bytes(bench_text(10_000).into_bytes()).unwrap();
    dict.build_index().unwrap();
    let searcher = dict.searcher().unwrap();

    let mut group = c.benchmark_group("search/any");
    for &(label, query) in QUERIES {
        group.bench_with_input(BenchmarkId::new(label, query), &query, |b, &query| {
            b.iter(|| searcher.search(query).entries(SearchMode::Any));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
