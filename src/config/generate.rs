pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# LOGRAKE CONFIGURATION
# =============================================================================
# Defaults for the lograke CLI. Every setting here can be overridden per
# invocation with the matching command-line flag.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/lograke/config.yml
#   3. /etc/lograke/config.yml
#
# Paths support ~ and $env{VAR} expansion.

# Directory of day-partitioned input files named YYYY-MM-DD.log.csv
logs_dir: csv_logs

# Directory query results are written to
results_dir: results

# Worker threads for aggregation and generation
threads: 4
"#
    .to_string()
}
