use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recipe-gallery")]
#[command(about = "レシピギャラリーの確認・擬似アップロードツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 静的データセットJSON（省略時は設定値、なければ組み込み版）
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ギャラリーのレシピ一覧を表示
    List {
        /// コンテナ幅（px）。グリッドの列数を表示
        #[arg(short, long)]
        width: Option<u32>,

        /// タグで絞り込む（大文字小文字は区別しない）
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// レシピ詳細を表示
    Show {
        /// レシピID
        #[arg(required = true)]
        id: String,
    },

    /// データセットJSONを検証
    Validate {
        /// データセットファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 画像ファイルで擬似アップロードを実行
    Upload {
        /// 画像ファイル
        #[arg(required = true)]
        file: PathBuf,

        /// MIMEタイプ（省略時は拡張子から推定）
        #[arg(long)]
        mime: Option<String>,

        /// 生成されたレシピのタイトルを変更
        #[arg(long)]
        title: Option<String>,

        /// 生成されたレシピの説明を変更
        #[arg(long)]
        description: Option<String>,

        /// 確認せずにギャラリーへ追加
        #[arg(long, conflicts_with = "cancel")]
        accept: bool,

        /// 確認せずに破棄
        #[arg(long)]
        cancel: bool,

        /// 保存を1回失敗させる
        #[arg(long)]
        fail_save: bool,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定を書き出す
        #[arg(long)]
        reset: bool,
    },
}
