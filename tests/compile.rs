//! End-to-end compilation tests against inline documents and fixtures.

use std::path::PathBuf;

use dmxctrl::{
    parse, parse_file, ChannelFrame, CompileOptions, Compiler, Control, DmxError, Icon,
    OverflowPolicy, Preset,
};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// `(name, channel)` for every channel-consuming control, in document order.
fn channels(source: &str) -> Vec<(String, u16)> {
    parse(source)
        .unwrap()
        .regulators()
        .map(|c| (c.name().to_string(), c.channel()))
        .collect()
}

fn pairs(expected: &[(&str, u16)]) -> Vec<(String, u16)> {
    expected.iter().map(|(n, c)| (n.to_string(), *c)).collect()
}

// -- Channel numbering --

#[test]
fn test_sequential_numbering_sums_footprints() {
    let got = channels(
        r#"<dmxcontrols>
             <level name="a"/>
             <colorlevel name="b"/>
             <switch name="c" nchannels="2"><option value="0 0"/><option value="1 1"/></switch>
             <level name="d"/>
           </dmxcontrols>"#,
    );
    assert_eq!(got, pairs(&[("a", 1), ("b", 2), ("c", 5), ("d", 7)]));
}

#[test]
fn test_panel_level_colorlevel_scenario() {
    let compiler = Compiler::new();
    let console = compiler
        .compile(r#"<dmxcontrols><panel><level/><colorlevel/></panel><level/></dmxcontrols>"#)
        .unwrap();

    let got: Vec<u16> = console.regulators().map(Control::channel).collect();
    // level=1, colorlevel=2..4, next free channel is 5
    assert_eq!(got, vec![1, 2, 5]);
}

#[test]
fn test_explicit_channel_resyncs_counter() {
    let got = channels(
        r#"<dmxcontrols>
             <level name="a"/>
             <level name="b" channel="100"/>
             <level name="c"/>
             <level name="d" channel="auto"/>
             <colorlevel name="e" channel="*"/>
             <level name="f"/>
           </dmxcontrols>"#,
    );
    assert_eq!(
        got,
        pairs(&[("a", 1), ("b", 100), ("c", 101), ("d", 102), ("e", 103), ("f", 106)])
    );
}

#[test]
fn test_explicit_channel_on_panel_moves_counter() {
    let got = channels(
        r#"<dmxcontrols>
             <panel channel="50"><level name="a"/></panel>
             <level name="b"/>
           </dmxcontrols>"#,
    );
    assert_eq!(got, pairs(&[("a", 50), ("b", 51)]));
}

#[test]
fn test_option_channel_equals_switch_channel() {
    let console = parse(
        r#"<dmxcontrols>
             <level/>
             <switch nchannels="2">
               <option value="1 2"/>
               <option value="3 4" channel="2"/>
             </switch>
             <level name="after"/>
           </dmxcontrols>"#,
    )
    .unwrap();

    let Some(Control::Switch(switch)) = console.children.get(1) else {
        panic!("expected a switch");
    };
    assert_eq!(switch.info.channel, 2);
    assert!(switch.options.iter().all(|o| o.info.channel == 2));
    assert_eq!(console.find("after").map(Control::channel), Some(4));
}

#[test]
fn test_option_channel_conflict_rejected() {
    let err = parse(
        r#"<dmxcontrols><switch><option value="1" channel="9"/><option value="2"/></switch></dmxcontrols>"#,
    )
    .unwrap_err();
    assert!(err.is_value_error());
}

#[test]
fn test_channel_overflow_policy() {
    let source = r#"<dmxcontrols><colorlevel channel="511"/></dmxcontrols>"#;

    let err = parse(source).unwrap_err();
    assert!(err.is_value_error());

    let console = Compiler::new()
        .with_options(CompileOptions {
            channel_overflow: OverflowPolicy::Allow,
            ..Default::default()
        })
        .compile(source)
        .unwrap();
    assert_eq!(console.regulators().next().map(Control::channel), Some(511));
}

#[test]
fn test_channel_out_of_range() {
    assert!(parse(r#"<dmxcontrols><level channel="0"/></dmxcontrols>"#).is_err());
    assert!(parse(r#"<dmxcontrols><level channel="513"/></dmxcontrols>"#).is_err());
    assert!(parse(r#"<dmxcontrols><level channel="512"/></dmxcontrols>"#).is_ok());
    // The counter runs out after channel 512
    assert!(parse(r#"<dmxcontrols><level channel="512"/><level/></dmxcontrols>"#).is_err());
}

// -- Switch validation --

#[test]
fn test_single_option_switch_rejected() {
    let err = parse_file(fixture("single_option.dmxctrl")).unwrap_err();

    assert!(err.is_value_error());
    assert_eq!(err.stack_path(), "dmxcontrols/switch");
    assert_eq!(err.location.map(|l| (l.line, l.column)), Some((5, 3)));
    assert!(err.to_string().contains("switch \"Gobo\" must have at least 2 options"));
}

#[test]
fn test_active_out_of_range() {
    let err = parse(
        r#"<dmxcontrols><switch active="3"><option value="0"/><option value="1"/></switch></dmxcontrols>"#,
    )
    .unwrap_err();
    assert!(err.is_value_error());
    assert!(err.to_string().contains("out of range 1..2"));
}

#[test]
fn test_option_arity_mismatch_is_value_error() {
    let err = parse(
        r##"<dmxcontrols>
             <switch nchannels="3">
               <option value="#ff0000"/>
               <option value="1 2"/>
             </switch>
           </dmxcontrols>"##,
    )
    .unwrap_err();

    assert!(err.is_value_error());
    assert!(!err.is_structural());
}

#[test]
fn test_panel_after_full_universe() {
    let console = parse(r#"<dmxcontrols><level channel="512"/><panel/></dmxcontrols>"#).unwrap();
    assert_eq!(console.children.len(), 2);

    let console = parse(
        r#"<dmxcontrols><level channel="512"/><panel><level channel="1"/></panel></dmxcontrols>"#,
    )
    .unwrap();
    let got: Vec<u16> = console.regulators().map(Control::channel).collect();
    assert_eq!(got, vec![512, 1]);

    // An auto-numbered regulator still has nowhere to go
    let err = parse(r#"<dmxcontrols><level channel="512"/><panel><level/></panel></dmxcontrols>"#)
        .unwrap_err();
    assert!(err.is_value_error());
    assert_eq!(err.stack_path(), "dmxcontrols/panel/level");
}

#[test]
fn test_lone_option_with_wrong_arity_reports_arity() {
    let err = parse(
        r#"<dmxcontrols><switch nchannels="2"><option value="1 2 3"/></switch></dmxcontrols>"#,
    )
    .unwrap_err();

    assert!(err.is_value_error());
    assert_eq!(err.stack_path(), "dmxcontrols/switch");
    assert!(
        err.to_string()
            .contains("option 1 of switch \"Switch #1\" has 3 value(s), expected 2"),
        "{}",
        err
    );
}

#[test]
fn test_colour_option_fills_three_channels() {
    let console = parse(
        r#"<dmxcontrols>
             <switch nchannels="3"><option value="red"/><option value="hls(240,50,100)"/></switch>
           </dmxcontrols>"#,
    )
    .unwrap();
    let Some(Control::Switch(switch)) = console.children.first() else {
        panic!("expected a switch");
    };
    assert_eq!(switch.options[0].value, vec![255, 0, 0]);
    assert_eq!(switch.options[1].value, vec![0, 0, 255]);
}

// -- Structure --

#[test]
fn test_misplaced_option() {
    let err = parse_file(fixture("misplaced.dmxctrl")).unwrap_err();

    assert!(err.is_structural());
    assert_eq!(err.stack, vec!["dmxcontrols", "panel", "option"]);
    assert_eq!(err.location.map(|l| (l.line, l.column)), Some((3, 5)));
    assert!(err
        .to_string()
        .ends_with("\"option\" must be child of \"switch\""));
}

#[test]
fn test_wrong_root_tag() {
    let err = parse("<console/>").unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.location.map(|l| (l.line, l.column)), Some((1, 1)));
}

#[test]
fn test_no_attribute_leakage() {
    for doc in [
        r#"<dmxcontrols><level color="red"/></dmxcontrols>"#,
        r#"<dmxcontrols><panel value="1"/></dmxcontrols>"#,
        r#"<dmxcontrols><level universe="2"/></dmxcontrols>"#,
        r#"<dmxcontrols><switch><option value="1" nchannels="1"/><option value="2"/></switch></dmxcontrols>"#,
        r#"<dmxcontrols active="1"/>"#,
    ] {
        let err = parse(doc).unwrap_err();
        assert!(err.is_structural(), "{}: {}", doc, err);
        assert!(err.to_string().contains("unsupported parameter(s)"), "{}", doc);
    }
}

#[test]
fn test_required_attribute_missing() {
    let err = parse(
        r#"<dmxcontrols><switch><option/><option value="1"/></switch></dmxcontrols>"#,
    )
    .unwrap_err();
    assert!(err.is_value_error());
    assert!(err.to_string().contains("required parameter \"value\" is missing"));
}

#[test]
fn test_bad_values_are_value_errors() {
    for doc in [
        r#"<dmxcontrols><level value="256"/></dmxcontrols>"#,
        r#"<dmxcontrols><level steps="33"/></dmxcontrols>"#,
        r#"<dmxcontrols><level vertical="maybe"/></dmxcontrols>"#,
        r##"<dmxcontrols><colorlevel color="#12345"/></dmxcontrols>"##,
        r#"<dmxcontrols universe="0"/>"#,
        r#"<dmxcontrols><switch nchannels="0"><option value="1"/><option value="2"/></switch></dmxcontrols>"#,
    ] {
        let err = parse(doc).unwrap_err();
        assert!(err.is_value_error(), "{}: {}", doc, err);
    }
}

// -- Colours --

#[test]
fn test_colour_representations_agree() {
    let colours: Vec<_> = ["#ff0000", "#f00", "255 0 0", "red", "RED", "hls(0,50,100)"]
        .iter()
        .map(|c| {
            let doc = format!(r#"<dmxcontrols><colorlevel color="{}"/></dmxcontrols>"#, c);
            match parse(&doc).unwrap().children.remove(0) {
                Control::ColorLevel(level) => level.color,
                other => panic!("unexpected {:?}", other),
            }
        })
        .collect();

    assert!(colours.windows(2).all(|w| w[0] == w[1]), "{:?}", colours);
}

// -- Whole documents --

#[test]
fn test_stage_fixture() {
    let console = parse_file(fixture("stage.dmxctrl")).unwrap();

    assert_eq!(console.info.name, "Stage");
    assert_eq!(console.comment_text(), "Main stage rig \n patch v2");
    assert_eq!(console.source.as_deref(), Some(fixture("stage.dmxctrl").as_path()));
    assert_eq!(
        console.info.icon,
        Some(Icon::File(fixture("icons").join("lamp.svg")))
    );

    let got: Vec<(String, u16)> = console
        .regulators()
        .map(|c| (c.name().to_string(), c.channel()))
        .collect();
    assert_eq!(
        got,
        pairs(&[
            ("House lights", 1),
            ("Aisle", 2),
            ("Wash L", 3),
            ("Wash R", 6),
            ("ColorLevel #1", 9),
            ("Pan", 20),
            ("Tilt", 21),
            ("Colour wheel", 22),
            ("Shutter", 25),
        ])
    );

    let aisle = console.find("Aisle").unwrap();
    assert_eq!(aisle.info().icon, Some(Icon::Internal("yellow".to_string())));
    assert!(console.find("ColorLevel #1").unwrap().info().hide_name);
    assert_eq!(
        console.find("House lights").unwrap().info().comment_text(),
        "Dimmer on the house circuit"
    );

    let Some(Control::Switch(shutter)) = console.find("Shutter") else {
        panic!("expected a switch");
    };
    assert_eq!(shutter.buttons_per_line, None);
    let Some(Control::Switch(wheel)) = console.find("Colour wheel") else {
        panic!("expected a switch");
    };
    assert_eq!(wheel.buttons_per_line, Some(4));

    assert!(dmxctrl::lint_console(&console).is_ok());
}

#[test]
fn test_stage_frames() {
    let console = parse_file(fixture("stage.dmxctrl")).unwrap();

    let initial = ChannelFrame::from_console(&console, Preset::Initial);
    assert_eq!(initial.get(1), Some(255));
    assert_eq!(initial.get(5), Some(128));
    assert_eq!(initial.get(20), Some(0));
    assert_eq!(initial.as_bytes()[21..24].to_vec(), vec![255, 0, 0]);
    assert_eq!(initial.get(25), Some(0));

    let max = ChannelFrame::from_console(&console, Preset::Maximum);
    assert_eq!(max.as_bytes()[5..11].to_vec(), vec![255, 128, 0, 255, 0, 255]);
    assert_eq!(max.as_bytes()[19..25].to_vec(), vec![255, 255, 0, 0, 255, 255]);
}

#[test]
fn test_recompilation_is_deterministic() {
    let path = fixture("stage.dmxctrl");
    let first = parse_file(&path).unwrap();
    let second = parse_file(&path).unwrap();
    assert_eq!(first, second);

    let compiler = Compiler::new();
    let source = std::fs::read_to_string(&path).unwrap();
    let a = compiler.with_base_dir(fixture("")).compile(&source).unwrap();
    let b = Compiler::new().with_base_dir(fixture("")).compile(&source).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_missing_icon_is_resource_error() {
    let err = parse(r#"<dmxcontrols><level icon="@nope/missing.png"/></dmxcontrols>"#).unwrap_err();
    assert!(err.is_resource_error());

    let unchecked = Compiler::new()
        .with_options(CompileOptions {
            check_icons: false,
            ..Default::default()
        })
        .compile(r#"<dmxcontrols><level icon="@nope/missing.png"/></dmxcontrols>"#);
    assert!(unchecked.is_ok());
}

#[test]
fn test_unknown_internal_icon() {
    let err = parse(r#"<dmxcontrols><panel icon="!sparkle"/></dmxcontrols>"#).unwrap_err();
    assert!(err.is_resource_error());
    assert!(matches!(err.cause, DmxError::Resource { .. }));
}

#[test]
fn test_overflow_fixture_under_allow() {
    let path = fixture("overflow.dmxctrl");
    assert!(parse_file(&path).unwrap_err().is_value_error());

    let console = Compiler::new()
        .with_options(CompileOptions {
            channel_overflow: OverflowPolicy::Allow,
            ..Default::default()
        })
        .compile_file(&path)
        .unwrap();
    let lint = dmxctrl::lint_console(&console);
    assert_eq!(lint.codes(), vec!["dmxctrl::lint::channel-overflow"]);

    // Channels past 512 are dropped from the frame
    let frame = ChannelFrame::from_console(&console, Preset::Maximum);
    assert_eq!(frame.as_bytes()[510..].to_vec(), vec![255, 255]);
}
