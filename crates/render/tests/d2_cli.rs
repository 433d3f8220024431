//! Exercises the real `d2` executable. Skipped when it is not installed.

use anyhow::{bail, Result};
use d2_render::{
    find_executable, AsciiMode, CompileOutcome, CompiledDiagram, D2Cli, DiagramBackend,
};

fn d2_backend() -> Option<D2Cli> {
    if find_executable("d2").is_none() {
        eprintln!("skipping: d2 not found on PATH");
        return None;
    }
    Some(D2Cli::default())
}

async fn compile(backend: &D2Cli, source: &str) -> Result<CompiledDiagram> {
    match backend.compile(source).await {
        CompileOutcome::Compiled(diagram) => Ok(diagram),
        other => bail!("expected {source:?} to compile, got {other:?}"),
    }
}

#[tokio::test]
async fn valid_source_renders_svg_and_ascii() -> Result<()> {
    let Some(backend) = d2_backend() else {
        return Ok(());
    };
    let diagram = compile(&backend, "a -> b\n").await?;

    let svg = backend.render_svg(&diagram).await?;
    let svg = String::from_utf8_lossy(&svg);
    let root = svg.trim_start().trim_start_matches(|c| c != '<');
    assert!(
        root.starts_with("<?xml") || root.starts_with("<svg"),
        "unexpected svg prefix: {}",
        &svg[..svg.len().min(80)]
    );
    assert!(svg.contains("<svg"));

    let extended = String::from_utf8(backend.render_ascii(&diagram, AsciiMode::Extended).await?)?;
    assert!(
        extended.chars().any(|c| ('\u{2500}'..='\u{257f}').contains(&c)),
        "extended mode should use box-drawing glyphs:\n{extended}"
    );

    let standard = String::from_utf8(backend.render_ascii(&diagram, AsciiMode::Standard).await?)?;
    assert!(standard.is_ascii(), "standard mode must be plain ASCII:\n{standard}");
    Ok(())
}

#[tokio::test]
async fn invalid_source_is_a_stable_user_error() -> Result<()> {
    let Some(backend) = d2_backend() else {
        return Ok(());
    };

    let mut messages = Vec::new();
    for _ in 0..2 {
        match backend.compile("a -> {\n").await {
            CompileOutcome::Invalid(message) => messages.push(message),
            other => bail!("expected a compile error, got {other:?}"),
        }
    }
    assert!(!messages[0].is_empty());
    assert_eq!(messages[0], messages[1]);
    Ok(())
}
