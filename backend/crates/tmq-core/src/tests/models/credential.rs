use crate::Credential;

#[test]
fn test_generated_credentials_are_distinct() {
    let first = Credential::generate("tc-foo", 1);
    let second = Credential::generate("tc-foo", 2);

    assert_ne!(first.password, second.password);
    assert_eq!(first.username, "tc-foo");
    // 32 bytes, base64url without padding
    assert_eq!(first.password.len(), 43);
}

#[test]
fn test_credential_debug_redacts_password() {
    let credential = Credential::generate("tc-foo", 1);
    let rendered = format!("{:?}", credential);

    assert!(!rendered.contains(&credential.password));
    assert!(rendered.contains("<redacted>"));
}
