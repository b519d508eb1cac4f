//! Tests for the pipeline parser.

use jish_kernel::parse::parse_cmdline;

#[test]
fn single_command_with_args() {
    let pipeline = parse_cmdline("ls -l /tmp").unwrap();
    assert_eq!(pipeline.stage_count(), 1);
    assert_eq!(pipeline.stages[0].cmd, "ls");
    assert_eq!(pipeline.stages[0].argv, vec!["ls", "-l", "/tmp"]);
    assert!(!pipeline.background);
    assert_eq!(pipeline.infile, None);
    assert_eq!(pipeline.outfile, None);
}

#[test]
fn three_stage_pipeline() {
    let pipeline = parse_cmdline("cat notes.txt | sort | uniq -c").unwrap();
    assert_eq!(pipeline.stage_count(), 3);
    assert_eq!(pipeline.stages[0].cmd, "cat");
    assert_eq!(pipeline.stages[1].cmd, "sort");
    assert_eq!(pipeline.stages[2].argv, vec!["uniq", "-c"]);
}

#[test]
fn redirections_attach_to_the_pipeline_ends() {
    let pipeline = parse_cmdline("sort < in.txt | uniq > out.txt").unwrap();
    assert_eq!(pipeline.infile.as_deref(), Some("in.txt"));
    assert_eq!(pipeline.outfile.as_deref(), Some("out.txt"));
    assert_eq!(pipeline.stage_count(), 2);
}

#[test]
fn background_flag() {
    let pipeline = parse_cmdline("sleep 100 &").unwrap();
    assert!(pipeline.background);
    assert_eq!(pipeline.stages[0].argv, vec!["sleep", "100"]);
}

#[test]
fn operators_need_no_surrounding_whitespace() {
    let pipeline = parse_cmdline("echo hi|cat>out.txt&").unwrap();
    assert_eq!(pipeline.stage_count(), 2);
    assert_eq!(pipeline.outfile.as_deref(), Some("out.txt"));
    assert!(pipeline.background);
}

#[test]
fn empty_stages_are_invalid() {
    assert!(parse_cmdline("| cat").is_err());
    assert!(parse_cmdline("cat |").is_err());
    assert!(parse_cmdline("a | | b").is_err());
    assert!(parse_cmdline("").is_err());
    assert!(parse_cmdline("   ").is_err());
}

#[test]
fn background_must_be_last() {
    assert!(parse_cmdline("sleep 5 & echo hi").is_err());
    assert!(parse_cmdline("& ls").is_err());
}

#[test]
fn redirections_need_a_target() {
    assert!(parse_cmdline("cat <").is_err());
    assert!(parse_cmdline("cat >").is_err());
    assert!(parse_cmdline("cat < | sort").is_err());
}

#[test]
fn duplicate_redirections_are_invalid() {
    assert!(parse_cmdline("cat < a < b").is_err());
    assert!(parse_cmdline("cat > a > b").is_err());
}
