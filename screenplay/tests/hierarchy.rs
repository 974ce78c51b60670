use screenplay::block::BlockType;
use screenplay::hierarchy::{Storyboard, format_duration, panel_title};
use screenplay::parser::{NoticeKind, Parser};

fn storyboard(source: &str) -> Storyboard {
    Parser::new(source, 0).storyboard()
}

fn titles(storyboard: &Storyboard) -> Vec<&str> {
    storyboard.panels.iter().map(|p| p.title.as_str()).collect()
}

#[test]
fn heading_nesting_closes_correctly() {
    let board = storyboard("# A\n## B\n#### P1\n## C\n#### P2\n");
    assert_eq!(titles(&board), vec!["P1", "P2"]);

    let p1 = &board.panels[0];
    assert_eq!(p1.nesting.act.as_deref(), Some("A"));
    assert_eq!(p1.nesting.scene.as_deref(), Some("B"));
    assert_eq!(p1.nesting.sequence, None);
    assert_eq!((p1.start_line, p1.end_line), (2, 2));

    let p2 = &board.panels[1];
    assert_eq!(p2.nesting.act.as_deref(), Some("A"));
    assert_eq!(p2.nesting.scene.as_deref(), Some("C"));
    assert_eq!((p2.start_line, p2.end_line), (4, 4));
}

#[test]
fn sequence_heading_closes_panel() {
    let board = storyboard("#### A\nText\n### Seq\n#### B\nMore\n");
    assert_eq!(titles(&board), vec!["A", "B"]);
    assert_eq!(board.panels[0].end_line, 1);
    assert!(board.panels[0].nesting.is_empty());
    assert_eq!(board.panels[1].nesting.sequence.as_deref(), Some("Seq"));
    assert_eq!(board.panels[1].end_line, 4);
}

#[test]
fn duration_first_wins() {
    let board = storyboard("#### Shot\n02:30\n00:10\n[i] a.png\n[i] b.png\nShe runs.\n");
    let panel = &board.panels[0];
    assert_eq!(panel.duration, Some(150));
    assert_eq!(panel.duration_label().as_deref(), Some("2:30"));
    assert_eq!(panel.image_url.as_deref(), Some("a.png"));
    assert_eq!(panel.audio_url, None);
    assert_eq!(panel.blocks.len(), 1);
    assert_eq!(panel.blocks[0].kind, BlockType::Action);
    assert_eq!(panel.blocks[0].index, 5);
    assert_eq!(
        panel.snippet,
        "02:30\n00:10\n[i] a.png\n[i] b.png\nShe runs."
    );

    let kinds: Vec<NoticeKind> = board.notices.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NoticeKind::IgnoredMetadata, NoticeKind::IgnoredMetadata]);
    assert_eq!(board.notices[0].line, 2);
    assert_eq!(board.total_duration(), 150);
}

#[test]
fn orphaned_metadata_is_dropped() {
    let board = storyboard("[i] lost.png\n# Act\n00:05\n#### P\n");
    assert_eq!(board.len(), 1);
    let panel = &board.panels[0];
    assert_eq!(panel.duration, None);
    assert_eq!(panel.image_url, None);
    assert!(panel.is_empty());

    let lines: Vec<(NoticeKind, usize)> = board.notices.iter().map(|n| (n.kind, n.line)).collect();
    assert_eq!(
        lines,
        vec![(NoticeKind::OrphanedMetadata, 0), (NoticeKind::OrphanedMetadata, 2)]
    );
}

#[test]
fn panel_blocks_use_the_assembler() {
    let board = storyboard("#### P\n\nALICE\nHi.\n\n");
    let panel = &board.panels[0];
    let kinds: Vec<BlockType> = panel.blocks.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![BlockType::Character, BlockType::Dialogue]);
    assert_eq!(panel.blocks[1].speakers, vec!["ALICE".to_string()]);
    assert_eq!(panel.snippet, "ALICE\nHi.");
    assert_eq!(panel.end_line, 4);
}

#[test]
fn panel_metadata_with_notes() {
    let board = storyboard("#### P\n00:05 [[rough]]\n[a] theme.mp3\n");
    assert_eq!(board.panels[0].duration, Some(5));
    assert_eq!(board.panels[0].audio_url.as_deref(), Some("theme.mp3"));
    assert!(board.panels[0].blocks.is_empty());
}

#[test]
fn title_page_is_not_part_of_the_storyboard() {
    let board = storyboard("Title: X\n===\n#### P\nText\n");
    assert_eq!(board.len(), 1);
    assert_eq!(board.panels[0].start_line, 2);
    assert_eq!(board.panels[0].blocks[0].index, 3);
}

#[test]
fn no_panels() {
    assert!(storyboard("").is_empty());
    assert!(storyboard("# Act\n## Scene\nJust text.\n").is_empty());
}

#[test]
fn untitled_panels() {
    let board = storyboard("####\n#### Panel 2:\n");
    assert_eq!(titles(&board), vec!["untitled", "untitled"]);
    assert_eq!(board.panels[0].end_line, 0);
}

#[test]
fn panel_titles() {
    assert_eq!(panel_title("Panel 3: The Chase"), "The Chase");
    assert_eq!(panel_title("panel 12 - Exit"), "Exit");
    assert_eq!(panel_title("PANEL 1:Opening"), "Opening");
    assert_eq!(panel_title("Panelists argue"), "Panelists argue");
    assert_eq!(panel_title("Panel one: x"), "Panel one: x");
    assert_eq!(panel_title("   "), "untitled");
}

#[test]
fn duration_labels() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(65), "1:05");
    assert_eq!(format_duration(600), "10:00");
}

#[test]
fn analysis_carries_both_views() {
    let analysis = screenplay::analyze("# Act\n#### P\n00:03\nALICE\nHi.\n");
    assert_eq!(analysis.storyboard.len(), 1);
    assert_eq!(analysis.storyboard.panels[0].duration, Some(3));
    assert_eq!(analysis.screenplay.characters.names(), ["ALICE"]);
}
