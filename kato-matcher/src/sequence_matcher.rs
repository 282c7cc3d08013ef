//! Ratcliff/Obershelp block-alignment matcher, a direct port of
//! `difflib.SequenceMatcher`'s matching-blocks algorithm, grounded on
//! `original_source`'s `kato/searches/pattern_search.py::InformationExtractor`
//! and the `kato.informatics.extractor` `SequenceMatcher` it wraps.

use kato_core::types::MatchingBlock;
use std::collections::HashMap;

/// Builds, for every element of `b`, the (ascending) list of indices at
/// which it occurs — the `b2j` map the longest-match search scans.
fn build_b2j(b: &[String]) -> HashMap<&str, Vec<usize>> {
    let mut b2j: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, elem) in b.iter().enumerate() {
        b2j.entry(elem.as_str()).or_default().push(j);
    }
    b2j
}

fn find_longest_match(a: &[String], b: &[String], b2j: &HashMap<&str, Vec<usize>>, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let mut besti = alo;
    let mut bestj = blo;
    let mut bestsize = 0usize;
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut newj2len: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b2j.get(a[i].as_str()) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                newj2len.insert(j, k);
                if k > bestsize {
                    besti = i + 1 - k;
                    bestj = j + 1 - k;
                    bestsize = k;
                }
            }
        }
        j2len = newj2len;
    }

    (besti, bestj, bestsize)
}

/// All non-terminator matching blocks between `a` and `b`, merged and
/// sorted by `i`. No terminator `(len(a), len(b), 0)` is appended here —
/// callers that need the terminator-aware block count add it explicitly,
/// matching `matching_blocks[:-1]` in the source.
pub fn matching_blocks(a: &[String], b: &[String]) -> Vec<MatchingBlock> {
    let b2j = build_b2j(b);
    let mut queue = vec![(0usize, a.len(), 0usize, b.len())];
    let mut raw = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = find_longest_match(a, b, &b2j, alo, ahi, blo, bhi);
        if k > 0 {
            raw.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
    }

    raw.sort_unstable();

    let mut merged = Vec::new();
    let (mut i1, mut j1, mut k1) = (0usize, 0usize, 0usize);
    for (i2, j2, k2) in raw {
        if i1 + k1 == i2 && j1 + k1 == j2 {
            k1 += k2;
        } else {
            if k1 > 0 {
                merged.push(MatchingBlock { i: i1, j: j1, n: k1 });
            }
            i1 = i2;
            j1 = j2;
            k1 = k2;
        }
    }
    if k1 > 0 {
        merged.push(MatchingBlock { i: i1, j: j1, n: k1 });
    }
    merged
}

/// `2 * matches / (len(a) + len(b))`, the Ratcliff/Obershelp similarity
/// ratio. Zero when both sequences are empty.
pub fn ratio(a: &[String], b: &[String], blocks: &[MatchingBlock]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let matches: usize = blocks.iter().map(|b| b.n).sum();
    2.0 * matches as f64 / total as f64
}

/// Opcodes derived from matching blocks: `(tag, a_range, b_range)` where
/// tag is `"equal"`, `"delete"`, `"insert"`, or `"replace"`, the same
/// reduction `difflib.SequenceMatcher.get_opcodes` performs.
pub enum Opcode {
    Equal(std::ops::Range<usize>, std::ops::Range<usize>),
    Delete(std::ops::Range<usize>),
    Insert(std::ops::Range<usize>),
    Replace(std::ops::Range<usize>, std::ops::Range<usize>),
}

pub fn opcodes(a: &[String], b: &[String]) -> Vec<Opcode> {
    let mut blocks = matching_blocks(a, b);
    blocks.push(MatchingBlock { i: a.len(), j: b.len(), n: 0 });

    let mut ops = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    for block in &blocks {
        let tag_ij = (i < block.i, j < block.j);
        match tag_ij {
            (true, true) => ops.push(Opcode::Replace(i..block.i, j..block.j)),
            (true, false) => ops.push(Opcode::Delete(i..block.i)),
            (false, true) => ops.push(Opcode::Insert(j..block.j)),
            (false, false) => {}
        }
        if block.n > 0 {
            ops.push(Opcode::Equal(block.i..block.i + block.n, block.j..block.j + block.n));
        }
        i = block.i + block.n;
        j = block.j + block.n;
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Vec<String> {
        s.split_whitespace().map(|x| x.to_string()).collect()
    }

    #[test]
    fn identical_sequences_are_one_block() {
        let a = seq("a b c");
        let blocks = matching_blocks(&a, &a);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], MatchingBlock { i: 0, j: 0, n: 3 });
        assert!((ratio(&a, &a, &blocks) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_sequences_have_no_blocks() {
        let a = seq("a b c");
        let b = seq("x y z");
        let blocks = matching_blocks(&a, &b);
        assert!(blocks.is_empty());
        assert_eq!(ratio(&a, &b, &blocks), 0.0);
    }

    #[test]
    fn partial_overlap_finds_the_shared_subsequence() {
        let a = seq("a b c d");
        let b = seq("x b c y");
        let blocks = matching_blocks(&a, &b);
        assert_eq!(blocks, vec![MatchingBlock { i: 1, j: 1, n: 2 }]);
    }

    #[test]
    fn opcodes_cover_the_full_sequences() {
        let a = seq("a b c d");
        let b = seq("x b c y");
        let ops = opcodes(&a, &b);
        // replace(a[0..1], b[0..1]), equal(a[1..3], b[1..3]), replace(a[3..4], b[3..4])
        assert_eq!(ops.len(), 3);
    }
}
