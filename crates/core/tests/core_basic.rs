use bisect_core::{locate, version};

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn locate_on_plain_text_finds_nothing() {
    assert!(locate("just some text\nwith no declarations\n").is_empty());
}
