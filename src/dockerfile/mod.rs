//! Dockerfile validator: three independent passes (syntax, security, best
//! practices) over the nom-tokenized instruction stream from
//! [`crate::analyzer::hadolint::parser`].
//!
//! Findings accumulate in a single [`crate::validate::ResultBuilder`] so the
//! quality score reflects all three passes together.

use crate::analyzer::hadolint::parser::instruction::{Arguments, HealthCheck, Instruction, InstructionPos};
use crate::analyzer::hadolint::parser::parse_dockerfile;
use crate::validate::{ResultBuilder, ValidationResult};

const PATH: &str = "Dockerfile";

/// Instructions the tokenizer knows how to parse natively. Anything else
/// surfaces as `Instruction::Unknown(keyword, _)`.
const FIXED_INSTRUCTIONS: &[&str] = &[
    "FROM", "RUN", "CMD", "ENTRYPOINT", "COPY", "ADD", "ENV", "EXPOSE", "WORKDIR", "USER",
    "VOLUME", "ARG", "HEALTHCHECK", "SHELL", "STOPSIGNAL", "LABEL", "MAINTAINER", "ONBUILD",
];

const SECRET_TOKENS: &[&str] = &[
    "PASSWORD",
    "TOKEN",
    "SECRET",
    "API_KEY",
    "PRIVATE_KEY",
    "JWT",
    "BEARER",
    "CERT",
    "PEM",
];

const DANGEROUS_PORTS: &[u16] = &[22, 23, 445, 3306, 3389, 5432, 6379, 27017];

/// Packages that have no business in a final image, only a build stage.
const DEV_PACKAGES: &[&str] = &["curl", "wget", "vim", "nano", "telnet", "netcat"];

/// Run the full three-pass validator over Dockerfile source text.
pub fn validate_dockerfile(content: &str) -> ValidationResult {
    let instructions = parse_dockerfile(content).unwrap_or_default();
    let mut builder = ResultBuilder::new();

    let stage_count = instructions.iter().filter(|p| matches!(p.instruction, Instruction::From(_))).count();
    builder.set_stat("multi_stage", stage_count > 1);

    syntax_pass(&instructions, stage_count, &mut builder);
    security_pass(&instructions, &mut builder);
    best_practices_pass(content, &instructions, stage_count, &mut builder);

    builder.build()
}

fn syntax_pass(instructions: &[InstructionPos], stage_count: usize, builder: &mut ResultBuilder) {
    let first_non_comment = instructions
        .iter()
        .find(|p| !matches!(p.instruction, Instruction::Comment(_)));

    match first_non_comment {
        Some(p) if matches!(p.instruction, Instruction::From(_)) => {}
        _ => {
            builder.add_error("DF001", PATH, "Dockerfile must start with a FROM instruction");
        }
    }
    if stage_count == 0 {
        builder.add_error("DF001", PATH, "no FROM instruction found");
    }

    let mut saw_latest = false;
    let mut saw_workdir = false;
    let mut cmd_count = 0;
    let mut entrypoint_count = 0;

    for pos in instructions {
        match &pos.instruction {
            Instruction::From(base) => {
                let untagged = base.tag.is_none() && base.digest.is_none();
                let is_latest = base.tag.as_deref() == Some("latest");
                if !base.is_scratch() && (is_latest || untagged) {
                    saw_latest = true;
                }
            }
            Instruction::Workdir(_) => saw_workdir = true,
            Instruction::Cmd(_) => cmd_count += 1,
            Instruction::Entrypoint(_) => entrypoint_count += 1,
            Instruction::Expose(ports) => {
                if ports.is_empty() && expose_args_nonempty(&pos.source_text) {
                    builder.add_error("DF006", PATH, &format!("line {}: EXPOSE port out of range [1, 65535]", pos.line_number));
                }
                for port in ports {
                    if port.number == 0 {
                        builder.add_error("DF006", PATH, &format!("line {}: EXPOSE port 0 is invalid", pos.line_number));
                    }
                }
            }
            Instruction::Maintainer(_) => {
                builder.add_warning("DF007", PATH, &format!("line {}: MAINTAINER is deprecated, use a LABEL instead", pos.line_number));
            }
            Instruction::Unknown(keyword, _) => {
                if !FIXED_INSTRUCTIONS.contains(&keyword.as_str()) {
                    builder.add_warning("DF008", PATH, &format!("line {}: unknown instruction `{keyword}`", pos.line_number));
                }
            }
            _ => {}
        }
    }

    if saw_latest {
        builder.add_warning("DF002", PATH, "base image has no pinned tag or uses `:latest`");
    }
    builder.set_stat("no_latest_tag", !saw_latest);

    if !saw_workdir {
        builder.add_warning("DF003", PATH, "no WORKDIR instruction; the build context's default working directory is implicit");
    }
    if cmd_count > 1 {
        builder.add_warning("DF004", PATH, "more than one CMD instruction; only the last one takes effect");
    }
    if entrypoint_count > 1 {
        builder.add_warning("DF005", PATH, "more than one ENTRYPOINT instruction; only the last one takes effect");
    }
}

/// `parse_port_spec` silently drops any token that doesn't fit a `u16`, so an
/// `EXPOSE` line with only out-of-range ports parses to an empty list. Guard
/// against treating a genuinely portless `EXPOSE` the same way by checking
/// the raw source line had arguments at all.
fn expose_args_nonempty(source_text: &str) -> bool {
    source_text
        .splitn(2, char::is_whitespace)
        .nth(1)
        .map(|rest| !rest.trim().is_empty())
        .unwrap_or(false)
}

fn security_pass(instructions: &[InstructionPos], builder: &mut ResultBuilder) {
    let mut saw_healthcheck = false;
    let mut saw_non_root_user = false;
    let mut saw_any_user = false;

    for pos in instructions {
        match &pos.instruction {
            Instruction::Healthcheck(hc) => {
                if !matches!(hc, HealthCheck::None) {
                    saw_healthcheck = true;
                }
            }
            Instruction::User(user) => {
                saw_any_user = true;
                let is_root = user == "0" || user.eq_ignore_ascii_case("root") || user.starts_with("0:");
                if !is_root {
                    saw_non_root_user = true;
                }
            }
            Instruction::Env(pairs) => {
                for (key, _value) in pairs {
                    let upper = key.to_uppercase();
                    if SECRET_TOKENS.iter().any(|tok| upper.contains(tok)) {
                        builder.add_error("DF010", PATH, &format!("line {}: ENV `{key}` looks like a secret; inject it at runtime instead", pos.line_number));
                    }
                }
            }
            Instruction::Run(args) => {
                if let Some(text) = shell_text(&args.arguments) {
                    let lower = text.to_lowercase();
                    if lower.contains("chmod 777") || lower.contains("chmod -r 777") || lower.contains("chmod 666") {
                        builder.add_warning("DF011", PATH, &format!("line {}: overly permissive chmod", pos.line_number));
                    }
                    check_apt_pairing(&lower, pos.line_number, builder);
                    for pkg in DEV_PACKAGES {
                        if lower.contains(&format!("install {pkg}")) || lower.contains(&format!(" {pkg} ")) && lower.contains("install") {
                            builder.add_warning("DF015", PATH, &format!("line {}: development package `{pkg}` installed outside a build stage", pos.line_number));
                        }
                    }
                }
            }
            Instruction::Expose(ports) => {
                for port in ports {
                    if DANGEROUS_PORTS.contains(&port.number) {
                        builder.add_warning("DF013", PATH, &format!("line {}: exposing well-known-sensitive port {}", pos.line_number, port.number));
                    }
                }
            }
            _ => {}
        }
    }

    if !saw_healthcheck {
        builder.add_warning("DF009", PATH, "no HEALTHCHECK instruction");
    }
    builder.set_stat("has_healthcheck", saw_healthcheck);

    if !saw_any_user || !saw_non_root_user {
        builder.add_warning("DF012", PATH, "container runs as root; add a non-root USER");
    }
}

fn check_apt_pairing(lower_cmd: &str, line: u32, builder: &mut ResultBuilder) {
    let has_update = lower_cmd.contains("apt-get update");
    let has_install = lower_cmd.contains("apt-get install");
    let has_upgrade = lower_cmd.contains("apt-get upgrade");

    if has_install && !has_upgrade {
        builder.add_warning("DF014", PATH, &format!("line {line}: apt-get install without a matching apt-get upgrade in the same layer"));
    }
    if has_update && !has_install {
        builder.add_warning("DF018", PATH, &format!("line {line}: apt-get update without apt-get install in the same layer; the cache won't persist to later layers"));
    }
    if has_install && !lower_cmd.contains("-y") && !lower_cmd.contains("--yes") {
        builder.add_warning("DF019", PATH, &format!("line {line}: apt-get install without -y will hang on a prompt in non-interactive builds"));
    }
}

fn best_practices_pass(
    content: &str,
    instructions: &[InstructionPos],
    stage_count: usize,
    builder: &mut ResultBuilder,
) {
    if stage_count <= 1 {
        builder.add_info("DF016", PATH, "single-stage build; consider a multi-stage build to shrink the final image");

        let build_tools = ["build-essential", "gcc", "make"];
        for pos in instructions {
            if let Instruction::Run(args) = &pos.instruction {
                if let Some(text) = shell_text(&args.arguments) {
                    let lower = text.to_lowercase();
                    if build_tools.iter().any(|t| lower.contains(t)) {
                        builder.add_warning("DF023", PATH, &format!("line {}: build toolchain installed in a single-stage image", pos.line_number));
                        break;
                    }
                }
            }
        }
    }

    let run_count = instructions.iter().filter(|p| matches!(p.instruction, Instruction::Run(_))).count();
    if run_count > 5 {
        builder.add_warning("DF017", PATH, &format!("{run_count} RUN instructions; combine layers where possible"));
    }

    for pos in instructions {
        match &pos.instruction {
            Instruction::Add(args, _flags) => {
                if !args.has_url() && !args.has_archive() {
                    builder.add_warning("DF020", PATH, &format!("line {}: ADD used where COPY would suffice", pos.line_number));
                }
            }
            Instruction::Copy(copy_args, _flags) => {
                let has_wildcard = copy_args.sources.iter().any(|s| s.contains('*') || s.contains('?'));
                let dest_looks_like_file = !copy_args.dest.ends_with('/') && copy_args.dest.rsplit('/').next().map(|last| last.contains('.')).unwrap_or(false);
                if has_wildcard && dest_looks_like_file {
                    builder.add_warning("DF021", PATH, &format!("line {}: wildcard COPY into what looks like a file destination", pos.line_number));
                }
            }
            _ => {}
        }
    }

    if !content.to_lowercase().contains(".dockerignore") {
        builder.add_info("DF022", PATH, "no mention of .dockerignore; a stray one may not exist, bloating the build context");
    }
}

fn shell_text(args: &Arguments) -> Option<&str> {
    match args {
        Arguments::Text(s) => Some(s.as_str()),
        Arguments::List(parts) => {
            let _ = parts;
            None
        }
    }
}

/// Derives the `session::DockerfileMetadata` an `apply_dockerfile`/
/// `generate_dockerfile` tool body attaches to the session's `Artifacts`,
/// by re-walking the same tokenized instruction stream the validator uses
/// rather than re-parsing findings out of a `ValidationResult`.
pub fn extract_metadata(content: &str) -> (String, crate::session::DockerfileMetadata) {
    let instructions = parse_dockerfile(content).unwrap_or_default();
    let stage_count = instructions.iter().filter(|p| matches!(p.instruction, Instruction::From(_))).count();

    let base_image = instructions
        .iter()
        .rev()
        .find_map(|p| match &p.instruction {
            Instruction::From(base) => {
                let registry = base.image.registry.as_deref().map(|r| format!("{r}/")).unwrap_or_default();
                let tag = base.tag.as_deref().map(|t| format!(":{t}")).unwrap_or_default();
                let digest = base.digest.as_deref().map(|d| format!("@{d}")).unwrap_or_default();
                Some(format!("{registry}{}{tag}{digest}", base.image.name))
            }
            _ => None,
        })
        .unwrap_or_default();

    let exposed_port = instructions.iter().find_map(|p| match &p.instruction {
        Instruction::Expose(ports) => ports.first().map(|port| port.number),
        _ => None,
    });

    let mut security_features = Vec::new();
    let mut optimization_features = Vec::new();

    let saw_healthcheck = instructions
        .iter()
        .any(|p| matches!(&p.instruction, Instruction::Healthcheck(hc) if !matches!(hc, HealthCheck::None)));
    if saw_healthcheck {
        security_features.push("healthcheck".to_string());
    }
    let saw_non_root_user = instructions.iter().any(|p| match &p.instruction {
        Instruction::User(user) => !(user == "0" || user.eq_ignore_ascii_case("root") || user.starts_with("0:")),
        _ => false,
    });
    if saw_non_root_user {
        security_features.push("non_root_user".to_string());
    }

    if stage_count > 1 {
        optimization_features.push("multi_stage".to_string());
    }
    let pinned = instructions.iter().all(|p| match &p.instruction {
        Instruction::From(base) => base.is_scratch() || base.tag.as_deref().is_some_and(|t| t != "latest") || base.digest.is_some(),
        _ => true,
    });
    if pinned {
        optimization_features.push("pinned_base_image".to_string());
    }

    (
        base_image,
        crate::session::DockerfileMetadata {
            exposed_port,
            build_stage_count: stage_count as u32,
            security_features,
            optimization_features,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_multi_stage_dockerfile_scores_high() {
        let df = r#"
# syntax=docker/dockerfile:1
FROM golang:1.22 AS build
WORKDIR /src
COPY . .
RUN go build -o /app .

FROM gcr.io/distroless/base-debian12
COPY --from=build /app /app
USER 65532:65532
HEALTHCHECK CMD ["/app", "--health"]
EXPOSE 8080
ENTRYPOINT ["/app"]
"#;
        let result = validate_dockerfile(df);
        assert!(result.is_valid());
        assert!(result.quality_score >= 90, "score was {}", result.quality_score);
    }

    #[test]
    fn latest_tag_and_missing_user_are_warnings_not_errors() {
        let df = "FROM ubuntu:latest\nWORKDIR /app\nCMD [\"./run\"]\n";
        let result = validate_dockerfile(df);
        assert!(result.is_valid());
        assert!(result.findings.iter().any(|f| f.code == "DF002"));
        assert!(result.findings.iter().any(|f| f.code == "DF012"));
        assert!(result.quality_score <= 90);
    }

    #[test]
    fn missing_from_is_an_error() {
        let df = "RUN echo hi\n";
        let result = validate_dockerfile(df);
        assert!(!result.is_valid());
        assert!(result.findings.iter().any(|f| f.code == "DF001" && f.severity == crate::validate::Severity::Error));
    }

    #[test]
    fn secret_env_is_an_error() {
        let df = "FROM scratch\nENV DB_PASSWORD=hunter2\n";
        let result = validate_dockerfile(df);
        assert!(!result.is_valid());
        assert!(result.findings.iter().any(|f| f.code == "DF010"));
    }

    #[test]
    fn dangerous_port_warns() {
        let df = "FROM scratch\nEXPOSE 3306\n";
        let result = validate_dockerfile(df);
        assert!(result.findings.iter().any(|f| f.code == "DF013"));
    }

    #[test]
    fn unknown_instruction_warns() {
        let df = "FROM scratch\nFROBNICATE something\n";
        let result = validate_dockerfile(df);
        assert!(result.findings.iter().any(|f| f.code == "DF008"));
    }

    #[test]
    fn many_run_layers_flagged() {
        let mut df = String::from("FROM scratch\n");
        for i in 0..6 {
            df.push_str(&format!("RUN echo {i}\n"));
        }
        let result = validate_dockerfile(&df);
        assert!(result.findings.iter().any(|f| f.code == "DF017"));
    }

    #[test]
    fn apt_get_without_yes_flag_warns() {
        let df = "FROM debian\nRUN apt-get update && apt-get install curl\n";
        let result = validate_dockerfile(df);
        assert!(result.findings.iter().any(|f| f.code == "DF019"));
    }
}
