//! gate CLI 分发：`run`、`doctor`、`token`、`version`。

use anyhow::{anyhow, bail};

use crate::{auth::token::TokenService, config::Config};

/// CLI 分发结果。
#[derive(Debug, PartialEq, Eq)]
pub enum CliDispatch {
    /// 继续进入网关主循环。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析并执行 gate CLI。
pub fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    let Some(cmd) = args.first().map(|arg| arg.trim()) else {
        return Ok(CliDispatch::Run);
    };
    if cmd.is_empty() || cmd == "run" {
        return Ok(CliDispatch::Run);
    }

    match cmd {
        "-h" | "--help" | "help" => {
            print_root_help();
            Ok(CliDispatch::Exit)
        }
        "doctor" => {
            let format = parse_doctor_format(&args[1..])?;
            run_doctor(format);
            Ok(CliDispatch::Exit)
        }
        "token" => {
            let subject = parse_token_subject(&args[1..])?;
            println!("{}", issue_cli_token(&Config::from_env()?, subject)?);
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `tg-gate --help` for usage"
        )),
    }
}

/// `doctor` 输出格式。
#[derive(Debug, PartialEq, Eq)]
enum DoctorFormat {
    Text,
    Json,
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    if args.is_empty() {
        return Ok(DoctorFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        };
    }
    Err(anyhow!("usage: tg-gate doctor [--format text|json]"))
}

/// 打印脱敏配置；配置无效时以退出码 1 结束。
fn run_doctor(format: DoctorFormat) {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config-error: {err:#}");
            std::process::exit(1);
        }
    };
    let summary = config.summary();

    match format {
        DoctorFormat::Text => {
            if let Some(fields) = summary.as_object() {
                for (key, value) in fields {
                    match value.as_str() {
                        Some(text) => println!("{key}: {text}"),
                        None => println!("{key}: {value}"),
                    }
                }
            }
        }
        DoctorFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

/// 解析 `token <subject>`。
fn parse_token_subject(args: &[String]) -> anyhow::Result<&str> {
    match args {
        [subject] if !subject.trim().is_empty() => Ok(subject.trim()),
        _ => Err(anyhow!("usage: tg-gate token <subject>")),
    }
}

/// 用已配置的密钥离线签发 token；随机密钥签出的 token 对运行中的服务无效，直接拒绝。
fn issue_cli_token(config: &Config, subject: &str) -> anyhow::Result<String> {
    let Some(secret) = config.token_secret.as_deref() else {
        bail!("GATE_TOKEN_SECRET is not set; tokens signed with an ephemeral key are useless");
    };
    let tokens = TokenService::new(secret, config.token_ttl_sec)?;
    Ok(tokens.issue(subject))
}

/// 打印 root help。
fn print_root_help() {
    println!("tg-gate usage:");
    println!("  tg-gate run");
    println!("  tg-gate doctor [--format text|json]");
    println!("  tg-gate token <subject>");
    println!("  tg-gate version");
}
