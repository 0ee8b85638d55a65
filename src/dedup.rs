// src/dedup.rs
//
// Duplicate evidence = same (link, description, source) triple. The first
// occurrence stays where it was; the same link from two sources, or with two
// different descriptions, is kept twice.

use std::collections::HashSet;

use crate::merge::MergedGame;

/// Collapse duplicate triples in place. Returns how many were removed.
pub fn dedup_patches(game: &mut MergedGame) -> usize {
    let keep = first_occurrences(&game.patch_links, &game.patch_descriptions, &game.patch_sources);
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        retain_mask(&mut game.patch_links, &keep);
        retain_mask(&mut game.patch_descriptions, &keep);
        retain_mask(&mut game.patch_sources, &keep);
    }
    removed
}

/// `true` at each index whose triple was not seen earlier.
pub fn first_occurrences(links: &[String], descriptions: &[String], sources: &[String]) -> Vec<bool> {
    let mut seen: HashSet<(&str, &str, &str)> = HashSet::with_capacity(links.len());
    links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let desc = descriptions.get(i).map(String::as_str).unwrap_or("");
            let source = sources.get(i).map(String::as_str).unwrap_or("");
            seen.insert((link.as_str(), desc, source))
        })
        .collect()
}

fn retain_mask(v: &mut Vec<String>, keep: &[bool]) {
    let mut flags = keep.iter();
    v.retain(|_| flags.next().copied().unwrap_or(true));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(rows: &[(&str, &str, &str)]) -> MergedGame {
        let mut g = MergedGame::default();
        for (l, d, s) in rows {
            g.push_patch(l, d, s);
        }
        g
    }

    #[test]
    fn keeps_first_of_each_triple() {
        let mut g = game(&[
            ("http://a", "d1", "steamapp"),
            ("http://b", "", "directg"),
            ("http://a", "d1", "steamapp"),
            ("http://a", "d1", "quasarplay"),
            ("http://a", "d2", "steamapp"),
        ]);
        assert_eq!(dedup_patches(&mut g), 1);
        assert_eq!(g.patch_links, vec!["http://a", "http://b", "http://a", "http://a"]);
        assert_eq!(g.patch_descriptions, vec!["d1", "", "d1", "d2"]);
        assert_eq!(g.patch_sources, vec!["steamapp", "directg", "quasarplay", "steamapp"]);
        assert!(g.is_aligned());
    }

    #[test]
    fn nothing_to_do() {
        let mut g = game(&[("x", "", "stove")]);
        assert_eq!(dedup_patches(&mut g), 0);
        assert_eq!(g.patch_count(), 1);
    }
}
