/// UUID v7 ベースの ID 型を定義する宣言型マクロ
///
/// 以下を一括生成する:
/// - Newtype 構造体（`Uuid` をラップ、`Copy` 可能）
/// - `new()`: UUID v7 を生成
/// - `new_at()`: 作成時刻を埋め込んだ UUID v7 と作成日時を生成
/// - `from_uuid()` / `as_uuid()`
/// - `parse()`: 文字列からの変換（不正な形式は `DomainError::Validation`）
/// - `Default` impl（`new()` に委譲）
///
/// # 使用例
///
/// ```rust
/// use conjob_domain::post::PostId;
///
/// let id = PostId::new();
/// let restored = PostId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, restored);
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident($label:expr);
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// 新しい ID を生成する（UUID v7）
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// `now` を作成時刻として埋め込んだ ID と、同じ精度の作成日時を返す
            ///
            /// 要素が削除されても ID から並び順キーをそのまま復元できる。
            pub fn new_at(
                now: chrono::DateTime<chrono::Utc>,
            ) -> (Self, chrono::DateTime<chrono::Utc>) {
                let created_at = $crate::pagination::truncate_to_id_precision(now);
                (Self($crate::pagination::v7_id_at(created_at)), created_at)
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// パスパラメータなどの文字列から ID を復元する
            pub fn parse(value: &str) -> Result<Self, $crate::DomainError> {
                uuid::Uuid::parse_str(value).map(Self).map_err(|_| {
                    $crate::DomainError::Validation(format!("Invalid {} id: {value}", $label))
                })
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// 本文系のバリデーション付き String Newtype を定義する宣言型マクロ
///
/// - `new()`: trim 後に空チェックと最大文字数チェックを行う
/// - `as_str()` / `into_string()`
///
/// 文字数は `chars().count()` で数える。
macro_rules! define_text_body {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, derive_more::Display)]
        #[display("{_0}")]
        $vis struct $Name(String);

        impl $Name {
            pub const MAX_LENGTH: usize = $max_length;

            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value = value.into().trim().to_string();

                if value.is_empty() {
                    return Err($crate::DomainError::Validation(format!(
                        "{} is required",
                        $label
                    )));
                }

                if value.chars().count() > Self::MAX_LENGTH {
                    return Err($crate::DomainError::Validation(format!(
                        "{} must be at most {} characters",
                        $label,
                        Self::MAX_LENGTH
                    )));
                }

                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }
    };
}
