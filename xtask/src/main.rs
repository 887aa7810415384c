//! # xtask - автоматизация сборки
//!
//! Команды сборки и проверки рабочего пространства.
//!
//! Список команд см. в [`HELP_TEXT`].
use anyhow::{Context, Result, bail};
use xshell::{Shell, cmd};

/// Текст справки для команды xtask.
pub const HELP_TEXT: &str = r#"xtask

Использование:
  cargo run -p xtask -- <команда>

Команды:
  help         Показать эту справку
  fmt          Запустить rustfmt
  fmt-check    Проверить форматирование (CI)
  clippy       Запустить clippy (workspace)
  test         Запустить тесты через nextest (workspace)
  e2e          Собрать бинарник blz и запустить e2e тесты
  ci           Запустить fmt-check + clippy + test (CI профиль)

Примечание:
  cargo-nextest устанавливается при первом запуске тестов
"#;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "help".to_string());

    let sh = Shell::new()?;
    sh.change_dir(project_root()?);

    match cmd.as_str() {
        "help" | "-h" | "--help" => help(),
        "fmt" => Ok(cmd!(sh, "cargo +nightly fmt --all").run()?),
        "fmt-check" => Ok(cmd!(sh, "cargo +nightly fmt --all -- --check").run()?),
        "clippy" => Ok(cmd!(sh, "cargo +nightly clippy --workspace -- -D warnings").run()?),
        "test" => {
            ensure_nextest(&sh)?;
            cmd!(sh, "cargo nextest run --workspace").run()?;
            // nextest не запускает doctest'ы
            cmd!(sh, "cargo test --workspace --doc").run()?;
            Ok(())
        }
        "e2e" => {
            ensure_nextest(&sh)?;
            cmd!(sh, "cargo build -p blz").run()?;
            cmd!(sh, "cargo nextest run -p e2e-tests").run()?;
            Ok(())
        }
        "ci" => {
            ensure_nextest(&sh)?;
            cmd!(sh, "cargo +nightly fmt --all -- --check").run()?;
            cmd!(sh, "cargo +nightly clippy --workspace -- -D warnings").run()?;
            // e2e тесты вызывают бинарник blz
            cmd!(sh, "cargo build --workspace").run()?;
            cmd!(sh, "cargo nextest run --workspace --profile ci").run()?;
            cmd!(sh, "cargo test --workspace --doc").run()?;
            Ok(())
        }
        other => bail!("Неизвестная команда: {other}\n\nЗапустите: cargo run -p xtask -- help"),
    }
}

fn help() -> Result<()> {
    println!("{HELP_TEXT}");
    Ok(())
}

/// Корень рабочего пространства: родитель каталога манифеста этого крейта.
fn project_root() -> Result<std::path::PathBuf> {
    Ok(std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)?
        .parent()
        .context("CARGO_MANIFEST_DIR has no parent directory")?
        .to_path_buf())
}

/// Устанавливает cargo-nextest, если он ещё не доступен.
fn ensure_nextest(sh: &Shell) -> Result<()> {
    if cmd!(sh, "cargo nextest --version").quiet().run().is_ok() {
        return Ok(());
    }

    eprintln!("cargo-nextest не найден, устанавливаю...");
    cmd!(sh, "cargo install cargo-nextest --locked").run()?;
    eprintln!("cargo-nextest установлен");
    Ok(())
}
