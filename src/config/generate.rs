pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# JOURNALD COLLECTOR CONFIGURATION
# =============================================================================
# Every section is optional; omitted keys fall back to the values shown here.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/journald-collector/config.yml
#   3. /etc/journald-collector/config.yml
#
# Environment variables can be referenced as $env{...} around the variable name.

# Units whose journals are harvested on every cycle. The first cycle for a
# unit only records its cursor; lines are delivered from the second cycle on.
units:
  - flocker-container-agent
  - flocker-dataset-agent
  - flocker-control

# Control units checked with `systemctl status`, in priority order. The host is
# considered worth monitoring as soon as one of them reports active.
detect:
  units:
    - flocker-dataset-agent
    - flocker-control

host:
  # Prefix used to run host tools from inside a container. Set to null to run
  # systemctl and journalctl directly.
  bridge:
    program: /usr/bin/docker
    args: [run, -i, --rm, -v, "/:/host", "centos:7", chroot, /host]
  systemctl: systemctl
  journalctl: journalctl
  # Extra environment variables for every host command
  env: {}

collector:
  # Time between collection cycles
  interval: 10s
  # A single unit read slower than this counts as failed ("infinite" disables)
  read_timeout: 30s
  # A whole cycle slower than this is abandoned ("infinite" disables)
  cycle_timeout: 60s
  # Exit without collecting when no control unit is active
  require_detection: true
"#
    .to_string()
}
