use assetview_core::{AssetType, Entry, PageSize, PageState, SortState, Tokens};
use assetview_search::{nav_controls, paginate, sort_entries, Highlighter, DEFAULT_CONTEXT_RADIUS};
use std::time::Instant;

const CHARACTERS: [&str; 12] = ["hski", "ttmr", "fktn", "amao", "kllj", "kcna", "ssmk", "shro", "hrnm", "hume", "hmsz", "jsna"];

fn gen_entry(i: usize) -> Entry {
    let kind = if i % 3 == 0 { AssetType::Resource } else { AssetType::AssetBundle };
    let prefix = match i % 4 {
        0 => "img_card",
        1 => "sud_vo",
        2 => "mdl_chr",
        _ => "bgm",
    };
    let name = format!("{}_{}_{:05}", prefix, CHARACTERS[i % CHARACTERS.len()], i);
    Entry::new(kind, (i * 7919 % 100_003) as u64, name)
}

/// 0 for an empty sample.
fn percentile_us(xs: &mut [u128], p: f64) -> u128 {
    if xs.is_empty() {
        return 0;
    }
    xs.sort_unstable();
    let idx = ((xs.len() as f64 - 1.0) * p).round() as usize;
    xs[idx]
}

fn main() {
    let n: usize = std::env::var("ASSETVIEW_BENCH_DOCS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000);
    let rounds: usize = std::env::var("ASSETVIEW_BENCH_ROUNDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(20)
        .max(1);

    eprintln!("generating {} entries", n);
    let mut entries: Vec<Entry> = (0..n).map(gen_entry).collect();

    let mut run_sort = |label: &str, sort: SortState| {
        let mut times: Vec<u128> = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            let t = Instant::now();
            sort_entries(&mut entries, sort);
            times.push(t.elapsed().as_micros());
        }
        let p50 = percentile_us(&mut times.clone(), 0.50) as f64 / 1000.0;
        let p99 = percentile_us(&mut times, 0.99) as f64 / 1000.0;
        println!("{}: p50={:.3}ms p99={:.3}ms ({} rounds, n={})", label, p50, p99, rounds, n);
    };
    run_sort("sort_name_asc", SortState::by_name(true));
    run_sort("sort_name_desc", SortState::by_name(false));
    run_sort("sort_id_asc", SortState::by_id(true));
    run_sort("sort_id_desc", SortState::by_id(false));

    let hl = Highlighter::new(Tokens::from_query("hski card").as_slice());
    let mut st = PageState::new(PageSize::new(PageSize::MAX));
    st.set_count(entries.len());
    let t = Instant::now();
    let mut marked = 0usize;
    for p in 1..=st.total_pages() {
        st.set_page(p);
        let page = paginate(&entries, &st);
        let _nav = nav_controls(p, page.total_pages, DEFAULT_CONTEXT_RADIUS);
        for e in page.entries {
            marked += hl.highlight(&e.name).matches("<mark>").count();
        }
    }
    println!(
        "page_walk: {:.3}ms pages={} marks={}",
        t.elapsed().as_secs_f64() * 1_000.0,
        st.total_pages(),
        marked
    );
}
