//! Attachment lifecycle tests for Kairan.
//!
//! Follows a file from upload through download to release on delete.

#![cfg(feature = "sqlite")]

mod common;

use common::TestBoard;
use kairan::{
    AttachmentStore, BoardService, KairanError, NewPost, Upload, ValidationError,
};

#[tokio::test]
async fn test_upload_download_delete() {
    let board = TestBoard::new().await;
    let service = board.service();
    let admin = board.admin().await;
    let user = board.user().await;

    let upload = Upload::new("Photo.JPG", b"\xff\xd8\xff".to_vec());
    let post = service
        .create_post(Some(&admin), &NewPost::new("see photo", "event"), Some(&upload))
        .await
        .unwrap();

    let attachment = post.attachment.clone().unwrap();
    assert_eq!(attachment.filetype, "jpg");
    assert!(attachment.filename.ends_with("_Photo.JPG"));
    assert_eq!(board.stored_file_count(), 1);

    let bytes = service
        .open_attachment(Some(&user), &attachment.filename)
        .await
        .unwrap();
    assert_eq!(bytes, b"\xff\xd8\xff");

    service.delete_post(Some(&admin), post.id).await.unwrap();

    assert!(service
        .list_posts(Some(&user), Some("event"))
        .await
        .unwrap()
        .is_empty());
    let err = service
        .open_attachment(Some(&user), &attachment.filename)
        .await
        .unwrap_err();
    assert!(matches!(err, KairanError::AttachmentNotFound { .. }));
    assert!(!board.storage.exists(&attachment.filename));
    assert_eq!(board.stored_file_count(), 0);
}

#[tokio::test]
async fn test_allow_list() {
    let board = TestBoard::new().await;
    let service = board.service();
    let admin = board.admin().await;

    for name in ["notes.txt", "script.sh", "archive.tar.gz", "noextension"] {
        let upload = Upload::new(name, b"data".to_vec());
        let err = service
            .create_post(Some(&admin), &NewPost::new("x", "event"), Some(&upload))
            .await
            .unwrap_err();
        assert!(
            matches!(err, KairanError::UnsupportedType { .. }),
            "{name} should be rejected"
        );
    }

    for name in ["a.png", "b.jpg", "c.jpeg", "d.PDF"] {
        let upload = Upload::new(name, b"data".to_vec());
        assert!(service
            .create_post(Some(&admin), &NewPost::new("x", "event"), Some(&upload))
            .await
            .is_ok());
    }
    assert_eq!(board.stored_file_count(), 4);
}

#[tokio::test]
async fn test_traversal_names_stay_inside_store() {
    let board = TestBoard::new().await;
    let service = board.service();
    let admin = board.admin().await;

    let upload = Upload::new("../../etc/evil.png", b"png".to_vec());
    let post = service
        .create_post(Some(&admin), &NewPost::new("x", "event"), Some(&upload))
        .await
        .unwrap();

    let filename = post.attachment.unwrap().filename;
    assert!(filename.ends_with("_evil.png"));
    assert!(!filename.contains('/'));
    let path = board.storage.file_path(&filename).unwrap();
    assert!(path.starts_with(board.storage.base_path()));

    let err = service
        .open_attachment(Some(&admin), "../../etc/passwd")
        .await
        .unwrap_err();
    assert!(matches!(err, KairanError::AttachmentNotFound { .. }));
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let board = TestBoard::new().await;
    let storage = AttachmentStore::new(board.dir.path().join("small"))
        .unwrap()
        .with_max_size(4);
    let service = BoardService::new(&board.db, &storage);
    let admin = board.admin().await;

    let upload = Upload::new("big.pdf", b"12345".to_vec());
    let err = service
        .create_post(Some(&admin), &NewPost::new("x", "event"), Some(&upload))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        KairanError::Validation(ValidationError::FileTooLarge { size: 5, limit: 4 })
    ));
}

#[tokio::test]
async fn test_forbidden_upload_is_not_stored() {
    let board = TestBoard::new().await;
    let service = board.service();
    let user = board.user().await;

    let upload = Upload::new("flyer.png", b"png".to_vec());
    let err = service
        .create_post(Some(&user), &NewPost::new("x", "event"), Some(&upload))
        .await
        .unwrap_err();
    assert!(matches!(err, KairanError::Auth(_)));
    assert_eq!(board.stored_file_count(), 0);
}
