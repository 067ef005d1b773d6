use crate::api::files::is_plain_file_name;

#[test]
fn given_plain_upload_names_when_checked_then_accepted() {
    assert!(is_plain_file_name("file-1700000000000-42.txt"));
    assert!(is_plain_file_name("notes"));
}

#[test]
fn given_traversal_attempts_when_checked_then_rejected() {
    for name in ["", ".", "..", "../secret", "a/b.txt", "..\\boot.ini", "x..y", "nul\0.txt"] {
        assert!(!is_plain_file_name(name), "{name:?} should be rejected");
    }
}
