//! Shared fixtures for command-line tests.

use std::path::Path;

use example::{Command, run};
use tokio_util::sync::CancellationToken;

/// Writes `files` below a fresh temporary project directory.
pub fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, content) in files {
        let path = dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    dir
}

/// A small game with a packaged asset and two composites.
pub fn game() -> tempfile::TempDir {
    project(&[
        ("Assets/Resources/readme.txt", "hello"),
        ("Assets/Resources/ui/icon.png", "png"),
        ("Assets/Resources/prefabs/player.prefab", "Transform\nCamera\nAudioSource\n"),
        ("Assets/Resources/prefabs/lamp.prefab", "Transform\nLight\n"),
        ("Assets/Textures/unlisted.png", "png"),
        ("Packages/com.acme.kit/Runtime/Resources/kit.json", "{}"),
    ])
}

/// Runs the command line `line` against `root`, returning stdout.
pub async fn stowage(root: &Path, line: &str) -> Result<String, example::CliError> {
    let mut words = line.split_whitespace().map(str::to_string);
    let mut args: Vec<String> = words.next().into_iter().collect();
    args.push(root.display().to_string());
    args.extend(words);

    let command = Command::parse(args)?;
    let mut out = Vec::new();
    run(command, &CancellationToken::new(), &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}
