//! Git source-control adapter tests against real repositories.
//!
//! Each fixture builds a bare `origin` plus two clones in a temporary
//! directory so rebases and pushes run against the local `git` executable.

use std::{fs, path::Path, process::Command};

use camino::{Utf8Path, Utf8PathBuf};
use hourglass::task::{
    adapters::git::GitSourceControl,
    ports::{SourceControl, SourceControlError},
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Remote {
    _dir: TempDir,
    origin: Utf8PathBuf,
    work: Utf8PathBuf,
    other: Utf8PathBuf,
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "dev@example.com"]);
    git(dir, &["config", "user.name", "Dev"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

fn commit_file(dir: &Path, name: &str, contents: &str, message: &str) {
    fs::write(dir.join(name), contents).expect("write file");
    git(dir, &["add", name]);
    git(dir, &["commit", "-m", message]);
}

fn utf8(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("utf-8 temp path")
}

#[fixture]
fn remote() -> Remote {
    let dir = TempDir::new().expect("create temp dir");
    let root = dir.path();
    let origin = root.join("origin.git");
    let work = root.join("work");
    let other = root.join("other");

    git(root, &["init", "--bare", "origin.git"]);
    git(root, &["init", "work"]);
    configure_identity(&work);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    commit_file(&work, "README.md", "first line\n", "Initial commit");
    git(&work, &["remote", "add", "origin", origin.to_str().expect("utf-8 path")]);
    git(&work, &["push", "-u", "origin", "main"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    git(
        root,
        &["clone", "--branch", "main", origin.to_str().expect("utf-8 path"), "other"],
    );
    configure_identity(&other);

    Remote {
        origin: utf8(&origin),
        work: utf8(&work),
        other: utf8(&other),
        _dir: dir,
    }
}

fn stash_entries(dir: &Utf8Path) -> String {
    git(dir.as_std_path(), &["stash", "list"])
}

fn last_subject(dir: &Utf8Path) -> String {
    git(dir.as_std_path(), &["log", "-1", "--format=%s"])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rebase_restores_a_dirty_working_tree(remote: Remote) {
    commit_file(remote.other.as_std_path(), "CHANGELOG.md", "entry\n", "Upstream change");
    git(remote.other.as_std_path(), &["push"]);
    fs::write(remote.work.join("README.md"), "first line\nlocal edit\n").expect("modify file");
    fs::write(remote.work.join("notes.txt"), "scratch\n").expect("write untracked file");

    GitSourceControl::local_only()
        .rebase_onto_upstream(&remote.work)
        .await
        .expect("rebase onto upstream");

    assert_eq!(last_subject(&remote.work), "Upstream change");
    assert_eq!(
        fs::read_to_string(remote.work.join("README.md")).expect("read file"),
        "first line\nlocal edit\n"
    );
    assert!(remote.work.join("notes.txt").exists());
    assert!(remote.work.join("CHANGELOG.md").exists());
    assert_eq!(stash_entries(&remote.work), "");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rebase_on_a_clean_tree_leaves_the_stash_alone(remote: Remote) {
    commit_file(remote.other.as_std_path(), "CHANGELOG.md", "entry\n", "Upstream change");
    git(remote.other.as_std_path(), &["push"]);

    GitSourceControl::local_only()
        .rebase_onto_upstream(&remote.work)
        .await
        .expect("rebase onto upstream");

    assert_eq!(last_subject(&remote.work), "Upstream change");
    assert_eq!(stash_entries(&remote.work), "");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conflicting_rebase_reports_the_rebase_failure(remote: Remote) {
    commit_file(remote.other.as_std_path(), "README.md", "their line\n", "Their change");
    git(remote.other.as_std_path(), &["push"]);
    commit_file(remote.work.as_std_path(), "README.md", "our line\n", "Our change");
    fs::write(remote.work.join("notes.txt"), "scratch\n").expect("write untracked file");

    let result = GitSourceControl::local_only()
        .rebase_onto_upstream(&remote.work)
        .await;

    match result {
        Err(SourceControlError::CommandFailed { command, .. }) => {
            assert!(command.starts_with("git rebase"), "unexpected command {command}");
        }
        other => panic!("expected a failed rebase, got {other:?}"),
    }
    assert!(!remote.work.join(".git/rebase-merge").exists());
    assert!(!remote.work.join(".git/rebase-apply").exists());
    assert_eq!(last_subject(&remote.work), "Our change");
    assert!(remote.work.join("notes.txt").exists());
    assert_eq!(stash_entries(&remote.work), "");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_commit_is_pushed_to_origin(remote: Remote) {
    let source_control = GitSourceControl::local_only();

    source_control
        .commit_all(&remote.work, "Start work on feature")
        .await
        .expect("commit on a clean tree");
    let subject = source_control
        .last_commit_subject(&remote.work)
        .await
        .expect("read last subject");
    source_control.push(&remote.work).await.expect("push");

    assert_eq!(subject.as_deref(), Some("Start work on feature"));
    assert_eq!(
        git(
            remote.origin.as_std_path(),
            &["log", "-1", "--format=%s", "main"]
        ),
        "Start work on feature"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_includes_untracked_files(remote: Remote) {
    fs::write(remote.work.join("notes.txt"), "scratch\n").expect("write untracked file");

    GitSourceControl::local_only()
        .commit_all(&remote.work, "Add notes")
        .await
        .expect("commit");

    assert_eq!(
        git(remote.work.as_std_path(), &["status", "--porcelain"]),
        ""
    );
    assert_eq!(
        git(remote.work.as_std_path(), &["show", "--name-only", "--format=", "HEAD"]),
        "notes.txt"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn repository_without_commits_has_no_last_subject() {
    let dir = TempDir::new().expect("create temp dir");
    git(dir.path(), &["init", "fresh"]);
    let fresh = utf8(&dir.path().join("fresh"));

    let subject = GitSourceControl::local_only()
        .last_commit_subject(&fresh)
        .await
        .expect("read last subject");

    assert_eq!(subject, None);
}
