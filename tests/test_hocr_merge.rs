//! Integration tests for hOCR translation and page merge.

use std::collections::HashSet;

use lazy_static::lazy_static;
use pageseg::geometry::Rect;
use pageseg::hocr::{translate_fragment, Fragment, HocrMerger};
use pageseg::{Error, RegionKey};
use proptest::prelude::*;
use regex::Regex;

lazy_static! {
    static ref ID: Regex = Regex::new(r"id='([a-z]+)_1_(\d+)'").unwrap();
    static ref BBOX: Regex = Regex::new(r"bbox (-?\d+) (-?\d+) (-?\d+) (-?\d+)").unwrap();
}

/// A two-line fragment shaped like Tesseract output for a small crop.
fn region_fragment(first: &str, second: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN"
    "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en" lang="en">
 <head>
  <title></title>
  <meta http-equiv="Content-Type" content="text/html;charset=utf-8"/>
  <meta name='ocr-system' content='tesseract 5.3.0' />
 </head>
 <body>
  <div class='ocr_page' id='page_1' title='image "/tmp/crop.png"; bbox 0 0 210 60; ppageno 0; scan_res 70 70'>
   <div class='ocr_carea' id='block_1_1' title="bbox 5 5 200 55">
    <p class='ocr_par' id='par_1_1' lang='eng' title="bbox 5 5 200 55">
     <span class='ocr_line' id='line_1_1' title="bbox 5 5 200 25; baseline 0 -4; x_size 20; x_descenders 4; x_ascenders 5">
      <span class='ocrx_word' id='word_1_1' title='bbox 5 5 100 25; x_wconf 95'>{first}</span>
      <span class='ocrx_word' id='word_1_2' title='bbox 110 5 200 25; x_wconf 90'>{first}</span>
     </span>
     <span class='ocr_caption' id='line_1_2' title="bbox 5 35 200 55; baseline 0 -4; x_size 20">
      <span class='ocrx_word' id='word_1_3' title='bbox 5 35 200 55; x_wconf 88'>{second}</span>
     </span>
    </p>
   </div>
  </div>
 </body>
</html>
"#
    )
}

fn key(l: i32, t: i32, r: i32, b: i32) -> RegionKey {
    RegionKey::from(Rect::new(l, t, r, b))
}

#[test]
fn test_merged_ids_unique_and_increasing_per_kind() {
    let fragments = vec![
        Fragment::new(key(500, 0, 700, 60), (495, 0), region_fragment("c", "d")),
        Fragment::new(key(0, 0, 200, 60), (0, 0), region_fragment("a", "b")),
        Fragment::new(key(0, 300, 200, 360), (0, 295), region_fragment("e", "f")),
    ];
    let merged = HocrMerger::new("scan.tif", 1200, 1600).merge(&fragments).unwrap();

    let mut seen = HashSet::new();
    let mut last: std::collections::HashMap<String, u32> = Default::default();
    for caps in ID.captures_iter(&merged) {
        let prefix = caps[1].to_string();
        let n: u32 = caps[2].parse().unwrap();
        assert!(seen.insert((prefix.clone(), n)), "duplicate id {}_1_{}", prefix, n);
        let prev = last.insert(prefix.clone(), n).unwrap_or(0);
        assert!(n > prev, "{} ids not increasing: {} after {}", prefix, n, prev);
    }
    assert_eq!(last.get("block"), Some(&3));
    assert_eq!(last.get("par"), Some(&3));
    assert_eq!(last.get("line"), Some(&6));
    assert_eq!(last.get("word"), Some(&9));
}

#[test]
fn test_merged_coordinates_are_page_global() {
    let fragments = vec![Fragment::new(key(300, 400, 500, 460), (295, 395), region_fragment("x", "y"))];
    let merged = HocrMerger::new("scan.tif", 1200, 1600).merge(&fragments).unwrap();

    assert!(merged.contains("title='bbox 300 400 395 420; x_wconf 95'>x</span>"));
    assert!(merged.contains("title=\"bbox 300 430 495 450; baseline 0 -4; x_size 20\""));
    assert!(merged.contains("bbox 0 0 1200 1600"));
    // the crop's own page node is gone
    assert!(!merged.contains("/tmp/crop.png"));
    for caps in BBOX.captures_iter(&merged) {
        let left: i32 = caps[1].parse().unwrap();
        assert!(left == 0 || left >= 300);
    }
}

#[test]
fn test_merge_order_follows_keys_not_input() {
    let fragments = vec![
        Fragment::new(key(0, 300, 200, 360), (0, 300), region_fragment("third", "z")),
        Fragment::new(key(0, 0, 200, 60), (0, 0), region_fragment("first", "z")),
        Fragment::global(RegionKey::PAGE, region_fragment("page", "z")),
    ];
    let merged = HocrMerger::new("scan.tif", 200, 400).merge(&fragments).unwrap();
    let page = merged.find(">page<").unwrap();
    let first = merged.find(">first<").unwrap();
    let third = merged.find(">third<").unwrap();
    assert!(page < first && first < third);
}

#[test]
fn test_malformed_fragment_fails_merge() {
    let broken = region_fragment("a", "b").replace("bbox 110 5 200 25", "bbox 110 5");
    let fragments = vec![
        Fragment::new(key(0, 0, 10, 10), (0, 0), region_fragment("ok", "ok")),
        Fragment::new(key(20, 0, 30, 10), (20, 0), broken),
    ];
    let err = HocrMerger::new("scan.tif", 100, 100).merge(&fragments).unwrap_err();
    match err {
        Error::MalformedFragment { line, .. } => assert_eq!(line, 16),
        other => panic!("expected malformed fragment, got {:?}", other),
    }
}

proptest! {
    #[test]
    fn prop_translation_adds_offset(
        a in 0i32..5000, b in 0i32..5000, w in 0i32..5000, h in 0i32..5000,
        dx in -2000i32..5000, dy in -2000i32..5000,
        semicolon in any::<bool>(),
    ) {
        let (c, d) = (a + w, b + h);
        let title = if semicolon {
            format!("title=\"bbox {} {} {} {}; x_wconf 80\"", a, b, c, d)
        } else {
            format!("title='bbox {} {} {} {}'", a, b, c, d)
        };
        let line = format!("<span class='ocrx_word' id='word_1_1' {}>w</span>\n", title);
        let out = translate_fragment(&line, dx, dy).unwrap();

        let caps = BBOX.captures(&out).unwrap();
        let got: Vec<i32> = (1..=4).map(|i| caps[i].parse().unwrap()).collect();
        prop_assert_eq!(got, vec![a + dx, b + dy, c + dx, d + dy]);
        if semicolon {
            prop_assert!(out.contains("; x_wconf 80\">w</span>"));
        } else {
            prop_assert!(out.contains("'>w</span>"));
        }
    }
}
