use std::fs;
use std::path::{Path, PathBuf};

use standoff::config::ConvertConfig;
use standoff::error::Result;
use standoff::pipeline::BatchDriver;
use tempfile::TempDir;

const REGENY_META: &str = r#"<cesDoc>
<cesHeader type="text"><fileDesc><titleStmt><title>Regény</title></titleStmt></fileDesc></cesHeader>
<text>
<div><head>Első</head><docAuthor>Író Ilona</docAuthor><date ISO8601="1999-01-01"/></div>
<div><head>Második</head></div>
</text>
</cesDoc>"#;

const VERS_META: &str = r#"<cesDoc><text><poem><head>Dal</head></poem></text></cesDoc>"#;

const REGENY_001: &str = "<doc file=\"regeny_001\"><div>\n\
    <head><s>\nElső\telső\tSZN\n</s></head>\n\
    <p><s>\nA\ta\tDET\nház\tház\tFN\n<g/>\n.\t.\tPUNCT\n</s></p>\n\
    </div></doc>";

const REGENY_002: &str = "<doc file=\"regeny_002\"><div>\n\
    <p><s>\nVége\tvég\tFN\n</s></p>\n\
    </div></doc>";

const VERS: &str = "<doc file=\"vers\"><poem><s>\nDal\tdal\tFN\n</s></poem></doc>";

struct Fixture {
    dir: TempDir,
    inputs: Vec<PathBuf>,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let meta = dir.path().join("meta").join("lit");
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join("regeny.xml"), REGENY_META).unwrap();
        fs::write(meta.join("vers.xml"), VERS_META).unwrap();

        let inputs = [
            ("noske_regeny_001.xml", REGENY_001),
            ("noske_regeny_002.xml", REGENY_002),
            ("noske_ismeretlen.xml", VERS),
            ("noske_vers.xml", VERS),
        ]
        .into_iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect();

        Fixture { dir, inputs }
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn config(&self) -> ConvertConfig {
        ConvertConfig::new(
            self.out(),
            self.dir.path().join("meta"),
            self.dir.path().join("checkpoint.tsv"),
        )
        .with_source_encoding("utf-8")
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_full_batch_writes_output_tree() -> Result<()> {
    let fixture = Fixture::new();
    let mut driver = BatchDriver::from_config(fixture.config())?;
    let summary = driver.run(&fixture.inputs)?;

    assert_eq!(summary.parents_written, 2);
    assert_eq!(summary.children_written, 3);
    assert_eq!(summary.unmatched.len(), 1);
    assert!(summary.unmatched[0].ends_with("noske_ismeretlen.xml"));

    let out = fixture.out();
    let parent = out.join("DOC000001");
    assert!(read(parent.join("header.xml")).contains("<idsHeader type=\"text\">"));
    // no corpus header in the poem's metadata
    assert!(!out.join("DOC000002").join("header.xml").exists());

    let child = parent.join("000001");
    for layer in ["sentences", "paragraphs"] {
        assert!(child.join("base").join(format!("{layer}.xml")).is_file());
    }
    for layer in [
        "tokens",
        "lemmas",
        "part-of-speech",
        "morpho",
        "word_cv",
        "word_syll",
        "lemma_cv",
        "lemma_syll",
        "word_phon",
        "lemma_phon",
    ] {
        assert!(child.join("noske").join(format!("{layer}.xml")).is_file(), "{layer}");
    }

    let data = read(child.join("data.xml"));
    assert!(data.contains("<text>Első A ház.</text>"));
    assert!(data.contains("docid=\"DOC000001.000001\""));

    let sentences = read(child.join("base").join("sentences.xml"));
    assert!(sentences.contains("<span from=\"0\" to=\"4\"/>"));
    assert!(sentences.contains("<span from=\"5\" to=\"11\"/>"));

    let header = read(child.join("header.xml"));
    assert!(header.contains("<t.title>Első</t.title>"));
    assert!(header.contains("<h.author>Író Ilona</h.author>"));
    assert!(header.contains("<creatDate>1999-01-01</creatDate>"));

    Ok(())
}

#[test]
fn test_split_fragments_share_parent_numbering() -> Result<()> {
    let fixture = Fixture::new();
    let mut driver = BatchDriver::from_config(fixture.config())?;
    driver.run(&fixture.inputs)?;

    let second = fixture.out().join("DOC000001").join("000002");
    assert!(read(second.join("data.xml")).contains("<text>Vége</text>"));
    // the second fragment's division lines up with the second metadata division
    assert!(read(second.join("header.xml")).contains("<t.title>Második</t.title>"));

    let poem = fixture.out().join("DOC000002").join("000001");
    assert!(read(poem.join("header.xml")).contains("<t.title>Dal</t.title>"));

    Ok(())
}

#[test]
fn test_token_offsets_agree_across_layers() -> Result<()> {
    let fixture = Fixture::new();
    let mut driver = BatchDriver::from_config(fixture.config())?;
    driver.run(&fixture.inputs)?;

    let noske = fixture.out().join("DOC000001").join("000001").join("noske");
    let offsets = |name: &str| -> Vec<String> {
        read(noske.join(format!("{name}.xml")))
            .lines()
            .filter(|line| line.trim_start().starts_with("<span "))
            .map(|line| line.trim().trim_end_matches("/>").trim_end_matches('>').to_string())
            .collect()
    };

    let tokens = offsets("tokens");
    assert_eq!(tokens.len(), 4);
    for layer in ["lemmas", "morpho", "word_phon"] {
        assert_eq!(offsets(layer), tokens, "{layer}");
    }
    Ok(())
}

#[test]
fn test_latin2_sources_by_default() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let meta = dir.path().join("meta");
    fs::create_dir_all(&meta).unwrap();
    fs::write(meta.join("osz.xml"), b"<t><div><head>\xD5sz</head></div></t>").unwrap();
    let input = dir.path().join("noske_osz.xml");
    fs::write(&input, b"<doc><div><s>\n\xF5sz\t\xF5sz\tFN\n</s></div></doc>").unwrap();

    let config = ConvertConfig::new(dir.path().join("out"), &meta, dir.path().join("ck.tsv"));
    let mut driver = BatchDriver::from_config(config)?;
    let summary = driver.run([&input])?;
    assert_eq!(summary.children_written, 1);

    let child = dir.path().join("out").join("DOC000001").join("000001");
    assert!(read(child.join("data.xml")).contains("<text>ősz</text>"));
    assert!(read(child.join("header.xml")).contains("<t.title>Ősz</t.title>"));
    Ok(())
}

#[test]
fn test_undecodable_source_is_skipped() -> Result<()> {
    let fixture = Fixture::new();
    fs::write(&fixture.inputs[3], b"<doc><div><s>\n\xFF\n</s></div></doc>").unwrap();

    let mut driver = BatchDriver::from_config(fixture.config())?;
    let summary = driver.run(&fixture.inputs)?;

    assert_eq!(summary.failed_sources.len(), 1);
    assert_eq!(summary.children_written, 2);
    assert!(!fixture.out().join("DOC000002").join("000001").exists());

    let strict = fixture.config().with_reset(true).with_fail_fast(true);
    assert!(BatchDriver::from_config(strict)?.run(&fixture.inputs).is_err());
    Ok(())
}
