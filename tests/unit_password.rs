use unibase_core::{hash_password, verify_password};

#[test]
fn test_hash_password_produces_bcrypt_hash() {
    let hash = hash_password("my-secret-password", 4).unwrap();
    assert!(hash.starts_with("$2"));
}

#[test]
fn test_verify_password_accepts_correct_password() {
    let hash = hash_password("my-secret-password", 4).unwrap();
    assert!(verify_password("my-secret-password", &hash).unwrap());
}

#[test]
fn test_verify_password_rejects_wrong_password() {
    let hash = hash_password("my-secret-password", 4).unwrap();
    assert!(!verify_password("not-the-password", &hash).unwrap());
}

#[test]
fn test_verify_password_rejects_garbage_hash() {
    assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
}
