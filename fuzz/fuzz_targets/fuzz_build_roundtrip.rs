#![no_main]

use arbitrary::Arbitrary;
use geotrie::index::view::TrieView;
use geotrie::index::{GeoTrie, TrieWriter};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    entries: Vec<(Vec<u8>, i32)>,
    queries: Vec<Vec<u8>>,
}

fuzz_target!(|input: Input| {
    let mut trie = GeoTrie::new();
    for (key, fid) in &input.entries {
        // Zero ids are "no identifier" and only match in the builder
        if *fid != 0 {
            trie.insert(key, *fid);
        }
    }

    let mut buf = Vec::new();
    TrieWriter::write_to(&trie, &mut buf).unwrap();
    let view = TrieView::parse(&buf).unwrap();
    view.verify().unwrap();

    for (key, _) in &input.entries {
        assert_eq!(view.search(key).unwrap(), trie.search(key));
    }
    for query in &input.queries {
        assert_eq!(view.search(query).unwrap(), trie.search(query));
    }
});
