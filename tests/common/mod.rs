#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use bgcpred::model::loader::{encode_artifact, ArtifactNames};
use bgcpred::model::{DecisionTree, LabelEncoder, LinearProjection, RandomForest, Reducer, ResidueEmbedding, TreeNode};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary working area holding a models directory and input files
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Create a models directory with the stump bundle under the default names
    pub fn with_models() -> Result<Self> {
        let env = Self::new()?;
        write_stump_models(&env.models_dir(), &ArtifactNames::default())?;
        Ok(env)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.temp_dir.path().join("models")
    }

    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// One-dimensional bundle: `A` embeds to 1.0, `C` to 0.0, the reducer is the
/// identity and a single stump splits at 0.5.
///
/// * mean ≤ 0.5 → [0.4, 0.6] → `NRPS` at 0.6
/// * mean > 0.5 → [0.7, 0.3] → `PKS` at 0.7
pub fn stump_parts() -> (RandomForest, LabelEncoder, Reducer, ResidueEmbedding) {
    let forest = RandomForest::new(
        1,
        2,
        vec![DecisionTree::new(vec![
            TreeNode::Split { feature: 0, threshold: 0.5, left: 1, right: 2 },
            TreeNode::Leaf { value: vec![4.0, 6.0] },
            TreeNode::Leaf { value: vec![7.0, 3.0] },
        ])],
    )
    .unwrap();
    let labels = LabelEncoder::new(vec!["PKS".to_string(), "NRPS".to_string()]).unwrap();
    let reducer = Reducer::Linear(LinearProjection::identity(1));
    let embedding = ResidueEmbedding::new(1, vec![(b'A', vec![1.0]), (b'C', vec![0.0])]).unwrap();
    (forest, labels, reducer, embedding)
}

pub fn write_stump_models(dir: &Path, names: &ArtifactNames) -> Result<()> {
    fs::create_dir_all(dir)?;
    let (forest, labels, reducer, embedding) = stump_parts();

    fs::write(dir.join(&names.classifier), encode_artifact(&names.classifier, &forest)?)?;
    fs::write(dir.join(&names.label_encoder), encode_artifact(&names.label_encoder, &labels)?)?;
    fs::write(dir.join(&names.reducer), encode_artifact(&names.reducer, &reducer)?)?;
    fs::write(dir.join(&names.embedding), embedding.to_word2vec_text())?;
    Ok(())
}

/// Helper to run the bgcpred binary with a clean environment
pub fn bgcpred_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bgcpred").unwrap();
    cmd.env_remove("BGCPRED_MODELS_DIR")
        .env_remove("RUST_LOG")
        .env_remove("BGCPRED_CONFIG")
        .env_remove("BGCPRED_LOG");
    cmd
}

pub fn two_record_fasta() -> String {
    ">first polyketide synthase\nAAAA\n>second peptide synthetase\ncc cc\n".to_string()
}

pub fn gbk_with_cds_and_promoter() -> String {
    r#"LOCUS       BGC0000042              60 bp    DNA     linear   BCT 01-JAN-2020
DEFINITION  Test cluster.
FEATURES             Location/Qualifiers
     promoter        1..10
     CDS             11..40
                     /locus_tag="orf1"
                     /product="ketosynthase"
                     /translation="AAAA
                     AAAC"
ORIGIN
        1 atgaaagcag cagcagcagc agcagcagca gcagcagcag cagcagcagc agcagcataa
//
"#
    .to_string()
}

/// Two records; the first has two translated CDS around a gene feature
pub fn gbk_two_records() -> String {
    r#"LOCUS       FIRST                   90 bp    DNA     linear   BCT 01-JAN-2020
FEATURES             Location/Qualifiers
     CDS             1..30
                     /locus_tag="first_1"
                     /translation="AAA"
     gene            31..60
                     /gene="spacer"
     CDS             61..90
                     /locus_tag="first_2"
                     /translation="CCC"
//
LOCUS       SECOND                  30 bp    DNA     linear   BCT 01-JAN-2020
FEATURES             Location/Qualifiers
     CDS             1..30
                     /locus_tag="second_1"
                     /translation="DDD"
//
"#
    .to_string()
}
