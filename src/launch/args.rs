//! Mapping from a launch plan to engine `run` arguments.

use super::LaunchPlan;

/// Named volume reused for Homebrew downloads across sessions.
pub const PACKAGE_CACHE_VOLUME: &str = "lazylab-brew-cache";

/// Build the isolation and mount flags for `run`, starting with `run` itself.
///
/// The keep-alive tail (name, entrypoint, image) is appended separately by
/// [`keep_alive_args`]. `--rm` is never emitted; teardown owns removal.
#[must_use]
pub fn build_run_args(plan: &LaunchPlan) -> Vec<String> {
    let mut args = vec![String::from("run")];
    let security = &plan.security;

    if security.disable_network {
        push_pair(&mut args, "--network", "none");
    }
    if security.read_only_root {
        args.push(String::from("--read-only"));
    }
    for writable in &plan.writable_paths {
        push_pair(
            &mut args,
            "--mount",
            &format!("type=tmpfs,destination={writable}"),
        );
    }
    if !plan.limits.memory.is_empty() {
        push_pair(&mut args, "--memory", &plan.limits.memory);
    }
    if !plan.limits.cpus.is_empty() {
        push_pair(&mut args, "--cpus", &plan.limits.cpus);
    }
    if plan.limits.pids != 0 {
        push_pair(&mut args, "--pids-limit", &plan.limits.pids.to_string());
    }
    if security.force_amd64 {
        push_pair(&mut args, "--platform", "linux/amd64");
    }
    if security.drop_all_capabilities {
        push_pair(&mut args, "--cap-drop", "ALL");
    }
    if security.no_new_privileges {
        push_pair(&mut args, "--security-opt", "no-new-privileges:true");
    }
    if !plan.user.is_empty() {
        push_pair(&mut args, "--user", &plan.user);
    }
    for mount in &plan.mounts {
        push_pair(
            &mut args,
            "--mount",
            &format!("type=bind,src={},dst={}", mount.host, mount.container),
        );
    }
    if plan.cache_packages {
        push_pair(
            &mut args,
            "--mount",
            &format!(
                "type=volume,src={PACKAGE_CACHE_VOLUME},dst={}",
                plan.package_cache_dir()
            ),
        );
    }
    args
}

/// Detach, name the instance and keep it alive with `tail -f /dev/null`.
#[must_use]
pub fn keep_alive_args(plan: &LaunchPlan) -> Vec<String> {
    vec![
        String::from("--detach"),
        String::from("--name"),
        String::from(plan.name.as_str()),
        String::from("--entrypoint"),
        String::from("tail"),
        plan.image.clone(),
        String::from("-f"),
        String::from("/dev/null"),
    ]
}

/// Full argument list for creating the instance.
#[must_use]
pub fn creation_args(plan: &LaunchPlan) -> Vec<String> {
    let mut args = build_run_args(plan);
    args.extend(keep_alive_args(plan));
    args
}

fn push_pair(args: &mut Vec<String>, flag: &str, value: &str) {
    args.push(String::from(flag));
    args.push(String::from(value));
}
