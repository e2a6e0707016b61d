//! Kubernetes manifest validator: per-document structural/security checks
//! plus a cross-document consistency pass over a full manifest submission.
//!
//! Multi-document YAML is split on `---` with best-effort line tracking and
//! parsed into generic [`serde_yaml::Value`] trees rather than a typed object
//! hierarchy: every check here operates on a handful of generic fields
//! (`apiVersion`, `kind`, `metadata.name`, `spec.*`) and a typed hierarchy
//! would add plumbing without buying anything back for this validator's
//! checks.

use crate::validate::{ResultBuilder, ValidationResult};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};

const DEPRECATED_API_VERSIONS: &[(&str, &str)] = &[
    ("extensions/v1beta1", "apps/v1"),
    ("apps/v1beta1", "apps/v1"),
    ("apps/v1beta2", "apps/v1"),
];

const DANGEROUS_CAPABILITIES: &[&str] = &["SYS_ADMIN", "NET_ADMIN", "SYS_PTRACE", "DAC_OVERRIDE"];

/// A single parsed manifest document with enough bookkeeping for
/// cross-document checks.
struct Doc {
    value: Value,
    path: String,
    kind: String,
    name: String,
    namespace: Option<String>,
}

pub fn validate_manifests(content: &str, path_label: &str) -> ValidationResult {
    let mut builder = ResultBuilder::new();

    let docs = match split_documents(content) {
        Ok(raw_docs) => raw_docs,
        Err(_) => {
            heuristic_fallback(content, path_label, &mut builder);
            return builder.build();
        }
    };

    let mut parsed = Vec::new();
    for (i, raw) in docs.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let label = format!("{path_label}#{}", i + 1);
        match serde_yaml::from_str::<Value>(raw) {
            Ok(value) => {
                if value.is_null() {
                    continue;
                }
                match structural_checks(&value, &label, &mut builder) {
                    Some((kind, name, namespace)) => {
                        security_checks(&value, &kind, &label, &mut builder);
                        parsed.push(Doc { value, path: label, kind, name, namespace });
                    }
                    None => {}
                }
            }
            Err(e) => {
                builder.add_error("K8S000", &label, &format!("YAML parse error: {e}"));
            }
        }
    }

    cross_document_checks(&parsed, &mut builder);
    builder.build()
}

/// Attempts a structured parse of the whole multi-document stream before
/// splitting it into per-document text. A stream that doesn't even parse as
/// a sequence of YAML documents (as opposed to one document with a bad
/// field) is reported here so the caller can fall back to
/// [`heuristic_fallback`] instead of drowning the submission in `K8S000`s.
fn split_documents(content: &str) -> Result<Vec<String>, serde_yaml::Error> {
    for document in serde_yaml::Deserializer::from_str(content) {
        Value::deserialize(document)?;
    }
    Ok(content.split("\n---").map(|s| s.to_string()).collect())
}

/// Presence/shape checks for one document. Returns `(kind, name, namespace)`
/// on success so the caller can run the security pass and register the
/// document for cross-document checks.
fn structural_checks(value: &Value, path: &str, builder: &mut ResultBuilder) -> Option<(String, String, Option<String>)> {
    let api_version = str_field(value, &["apiVersion"]);
    let kind = str_field(value, &["kind"]);
    let name = str_field(value, &["metadata", "name"]);

    let Some(kind) = kind else {
        builder.add_error("K8S001", path, "missing `kind`");
        return None;
    };
    if api_version.is_none() {
        builder.add_error("K8S002", path, "missing `apiVersion`");
    }
    let Some(name) = name else {
        builder.add_error("K8S003", path, "missing `metadata.name`");
        return None;
    };
    let namespace = str_field(value, &["metadata", "namespace"]);

    if let Some(ref av) = api_version {
        if let Some((_, replacement)) = DEPRECATED_API_VERSIONS.iter().find(|(old, _)| *old == av.as_str()) {
            builder.add_warning("K8S004", path, &format!("deprecated apiVersion `{av}`; use `{replacement}`"));
        }
    }

    match kind.as_str() {
        "Deployment" | "StatefulSet" | "DaemonSet" => {
            if get(value, &["spec", "selector"]).is_none() {
                builder.add_error("K8S005", path, &format!("{kind} is missing spec.selector"));
            }
            if kind == "Deployment" {
                match get(value, &["spec", "replicas"]) {
                    None => builder.add_warning("K8S006", path, "Deployment has no explicit spec.replicas"),
                    Some(Value::Number(n)) if n.as_i64() == Some(1) => {
                        builder.add_warning("K8S006", path, "Deployment runs a single replica");
                    }
                    _ => {}
                }
            }
        }
        "Service" => {
            if get(value, &["spec", "ports"]).is_none() {
                builder.add_error("K8S007", path, "Service is missing spec.ports");
            }
        }
        "ConfigMap" => {
            if get(value, &["data"]).is_none() && get(value, &["binaryData"]).is_none() {
                builder.add_warning("K8S008", path, "ConfigMap has neither data nor binaryData");
            }
        }
        "Secret" => {
            if get(value, &["data"]).is_none() && get(value, &["stringData"]).is_none() {
                builder.add_warning("K8S008", path, "Secret has neither data nor stringData");
            }
        }
        _ => {}
    }

    Some((kind, name, namespace))
}

fn security_checks(value: &Value, kind: &str, path: &str, builder: &mut ResultBuilder) {
    if !matches!(kind, "Deployment" | "StatefulSet" | "DaemonSet" | "Pod" | "Job" | "CronJob") {
        return;
    }
    let Some(pod_spec) = pod_spec_of(value, kind) else { return };

    let pod_sc = get(pod_spec, &["securityContext"]);
    if pod_sc.is_none() {
        builder.add_warning("K8S010", path, "pod spec has no securityContext");
    }
    let run_as_user = pod_sc.and_then(|sc| get(sc, &["runAsUser"])).and_then(Value::as_i64);
    match run_as_user {
        Some(0) => builder.add_warning("K8S011", path, "pod runs as UID 0 (runAsUser: 0)"),
        None => builder.add_warning("K8S011", path, "pod spec has no runAsUser"),
        _ => {}
    }
    let run_as_non_root = pod_sc.and_then(|sc| get(sc, &["runAsNonRoot"])).and_then(Value::as_bool);
    if run_as_non_root != Some(true) {
        builder.add_info("K8S012", path, "consider setting runAsNonRoot: true");
    }

    for container in containers_of(pod_spec) {
        let name = str_field(container, &["name"]).unwrap_or_else(|| "<unnamed>".to_string());
        let csc = get(container, &["securityContext"]);
        if csc.is_none() {
            builder.add_warning("K8S013", path, &format!("container `{name}` has no securityContext"));
        }
        if csc.and_then(|sc| get(sc, &["privileged"])).and_then(Value::as_bool) == Some(true) {
            builder.add_error("K8S014", path, &format!("container `{name}` runs privileged"));
        }
        if let Some(caps) = csc.and_then(|sc| get(sc, &["capabilities", "add"])).and_then(Value::as_sequence) {
            for cap in caps {
                if let Some(cap) = cap.as_str() {
                    if DANGEROUS_CAPABILITIES.contains(&cap) {
                        builder.add_warning("K8S015", path, &format!("container `{name}` adds capability {cap}"));
                    }
                }
            }
        }
        let readonly_fs = csc.and_then(|sc| get(sc, &["readOnlyRootFilesystem"])).and_then(Value::as_bool);
        if readonly_fs != Some(true) {
            builder.add_info("K8S016", path, &format!("container `{name}` does not set readOnlyRootFilesystem: true"));
        }
        let allow_esc = csc.and_then(|sc| get(sc, &["allowPrivilegeEscalation"])).and_then(Value::as_bool);
        if allow_esc != Some(false) {
            builder.add_info("K8S017", path, &format!("container `{name}` does not set allowPrivilegeEscalation: false"));
        }
        let resources = get(container, &["resources"]);
        if resources.and_then(|r| get(r, &["limits"])).is_none() {
            builder.add_warning("K8S018", path, &format!("container `{name}` has no resource limits"));
        }
        if resources.and_then(|r| get(r, &["requests"])).is_none() {
            builder.add_warning("K8S018", path, &format!("container `{name}` has no resource requests"));
        }
        if let Some(image) = str_field(container, &["image"]) {
            if image.ends_with(":latest") || !image.contains(':') {
                builder.add_warning("K8S019", path, &format!("container `{name}` uses image `{image}` with latest/no tag"));
            }
        }
    }
}

fn cross_document_checks(docs: &[Doc], builder: &mut ResultBuilder) {
    let namespaces: HashSet<&str> = docs.iter().filter_map(|d| d.namespace.as_deref()).collect();
    if namespaces.len() > 1 {
        builder.add_warning("K8S020", "<submission>", &format!("manifests span {} namespaces", namespaces.len()));
    }

    let mut seen_names: HashMap<&str, &str> = HashMap::new();
    for doc in docs {
        if let Some(prev_kind) = seen_names.get(doc.name.as_str()) {
            if *prev_kind != doc.kind {
                builder.add_error("K8S021", &doc.path, &format!("name `{}` reused across kinds {} and {}", doc.name, prev_kind, doc.kind));
            }
        } else {
            seen_names.insert(&doc.name, &doc.kind);
        }
    }

    let workloads: Vec<&Doc> = docs.iter().filter(|d| matches!(d.kind.as_str(), "Deployment" | "StatefulSet" | "DaemonSet")).collect();
    let configmaps: HashSet<&str> = docs.iter().filter(|d| d.kind == "ConfigMap").map(|d| d.name.as_str()).collect();
    let secrets: HashSet<&str> = docs.iter().filter(|d| d.kind == "Secret").map(|d| d.name.as_str()).collect();

    for doc in docs.iter().filter(|d| d.kind == "Service") {
        let selector = get(&doc.value, &["spec", "selector"]).and_then(Value::as_mapping).cloned();
        let service_ports: Vec<i64> = get(&doc.value, &["spec", "ports"])
            .and_then(Value::as_sequence)
            .map(|ports| ports.iter().filter_map(|p| get(p, &["targetPort"]).or_else(|| get(p, &["port"])).and_then(Value::as_i64)).collect())
            .unwrap_or_default();

        let Some(selector) = selector else { continue };
        let matching_workload = workloads.iter().find(|w| {
            let Some(labels) = get(&w.value, &["spec", "template", "metadata", "labels"]) else {
                return false;
            };
            selector.iter().all(|(k, v)| {
                k.as_str().and_then(|k| labels.get(k)) == Some(v)
            })
        });

        match matching_workload {
            None => {
                builder.add_error("K8S302", &doc.path, "Service selector matches no workload's pod-template labels");
            }
            Some(workload) => {
                if !service_ports.is_empty() {
                    let container_ports: Vec<i64> = containers_of(pod_spec_of(&workload.value, &workload.kind).unwrap_or(&workload.value))
                        .flat_map(|c| get(c, &["ports"]).and_then(Value::as_sequence).cloned().unwrap_or_default())
                        .filter_map(|p| get(&p, &["containerPort"]).and_then(Value::as_i64))
                        .collect();
                    for port in &service_ports {
                        if !container_ports.contains(port) {
                            builder.add_error("K8S301", &doc.path, &format!("Service port {port} has no matching containerPort on `{}`", workload.name));
                        }
                    }
                }
            }
        }
    }

    for doc in docs {
        for env_source in env_from_refs(&doc.value, &doc.kind) {
            match env_source {
                (Kind::ConfigMap, name) if !configmaps.contains(name.as_str()) => {
                    builder.add_error("K8S022", &doc.path, &format!("configMapRef `{name}` does not resolve to a ConfigMap in this submission"));
                }
                (Kind::Secret, name) if !secrets.contains(name.as_str()) => {
                    builder.add_error("K8S022", &doc.path, &format!("secretRef `{name}` does not resolve to a Secret in this submission"));
                }
                _ => {}
            }
        }
    }
}

enum Kind {
    ConfigMap,
    Secret,
}

fn env_from_refs(value: &Value, kind: &str) -> Vec<(Kind, String)> {
    let mut refs = Vec::new();
    let Some(pod_spec) = pod_spec_of(value, kind) else { return refs };
    for container in containers_of(pod_spec) {
        if let Some(sources) = get(container, &["envFrom"]).and_then(Value::as_sequence) {
            for source in sources {
                if let Some(name) = str_field(source, &["configMapRef", "name"]) {
                    refs.push((Kind::ConfigMap, name));
                }
                if let Some(name) = str_field(source, &["secretRef", "name"]) {
                    refs.push((Kind::Secret, name));
                }
            }
        }
    }
    refs
}

fn pod_spec_of<'a>(value: &'a Value, kind: &str) -> Option<&'a Value> {
    match kind {
        "Pod" => get(value, &["spec"]),
        "Job" => get(value, &["spec", "template", "spec"]),
        "CronJob" => get(value, &["spec", "jobTemplate", "spec", "template", "spec"]),
        _ => get(value, &["spec", "template", "spec"]),
    }
}

fn containers_of(pod_spec: &Value) -> impl Iterator<Item = &Value> {
    get(pod_spec, &["containers"]).and_then(Value::as_sequence).into_iter().flatten()
}

fn get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    Some(current)
}

fn str_field(value: &Value, path: &[&str]) -> Option<String> {
    get(value, path).and_then(Value::as_str).map(str::to_string)
}

/// String-based heuristics used when the submission doesn't parse as YAML
/// at all, so one malformed document doesn't abort the whole validation.
fn heuristic_fallback(content: &str, path: &str, builder: &mut ResultBuilder) {
    builder.add_error("K8S000", path, "manifest submission failed to parse as YAML; falling back to heuristic checks");
    if !content.contains("apiVersion") {
        builder.add_warning("K8S002", path, "no `apiVersion:` found anywhere in the submission");
    }
    if !content.contains("kind:") {
        builder.add_warning("K8S001", path, "no `kind:` found anywhere in the submission");
    }
    if content.contains(":latest") {
        builder.add_warning("K8S019", path, "`:latest` image tag referenced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_PAIR: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 2
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      securityContext:
        runAsNonRoot: true
        runAsUser: 1000
      containers:
        - name: web
          image: ghcr.io/example/web:1.4.0
          ports:
            - containerPort: 8080
          securityContext:
            readOnlyRootFilesystem: true
            allowPrivilegeEscalation: false
          resources:
            limits:
              cpu: "500m"
              memory: "256Mi"
            requests:
              cpu: "100m"
              memory: "128Mi"
---
apiVersion: v1
kind: Service
metadata:
  name: web
spec:
  selector:
    app: web
  ports:
    - port: 80
      targetPort: 8080
"#;

    #[test]
    fn valid_deployment_service_pair_has_no_cross_document_errors() {
        let result = validate_manifests(VALID_PAIR, "manifests.yaml");
        assert!(result.findings.iter().all(|f| f.code != "K8S301" && f.code != "K8S302"));
    }

    #[test]
    fn missing_kind_is_an_error() {
        let doc = "apiVersion: v1\nmetadata:\n  name: x\n";
        let result = validate_manifests(doc, "manifests.yaml");
        assert!(result.findings.iter().any(|f| f.code == "K8S001"));
        assert!(!result.is_valid());
    }

    #[test]
    fn deprecated_api_version_warns() {
        let doc = "apiVersion: extensions/v1beta1\nkind: Deployment\nmetadata:\n  name: x\nspec:\n  selector:\n    matchLabels:\n      app: x\n";
        let result = validate_manifests(doc, "manifests.yaml");
        assert!(result.findings.iter().any(|f| f.code == "K8S004"));
    }

    #[test]
    fn service_with_no_matching_workload_is_an_error() {
        let doc = "apiVersion: v1\nkind: Service\nmetadata:\n  name: orphan\nspec:\n  selector:\n    app: nowhere\n  ports:\n    - port: 80\n";
        let result = validate_manifests(doc, "manifests.yaml");
        assert!(result.findings.iter().any(|f| f.code == "K8S302"));
    }

    #[test]
    fn duplicate_name_across_kinds_is_an_error() {
        let doc = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: shared\ndata:\n  k: v\n---\napiVersion: v1\nkind: Secret\nmetadata:\n  name: shared\nstringData:\n  k: v\n";
        let result = validate_manifests(doc, "manifests.yaml");
        assert!(result.findings.iter().any(|f| f.code == "K8S021"));
    }

    #[test]
    fn unresolved_configmap_ref_is_an_error() {
        let doc = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: app
spec:
  selector:
    matchLabels:
      app: app
  template:
    metadata:
      labels:
        app: app
    spec:
      containers:
        - name: app
          image: app:1.0.0
          envFrom:
            - configMapRef:
                name: missing-config
"#;
        let result = validate_manifests(doc, "manifests.yaml");
        assert!(result.findings.iter().any(|f| f.code == "K8S022"));
    }

    #[test]
    fn unparseable_submission_degrades_to_heuristic_fallback() {
        let garbage = "apiVersion: v1\nkind: [Deployment\nmetadata: {name: x\n";
        assert!(split_documents(garbage).is_err());

        let result = validate_manifests(garbage, "manifests.yaml");
        assert!(result.findings.iter().any(|f| f.code == "K8S000"));
        assert!(!result.is_valid());
    }
}
