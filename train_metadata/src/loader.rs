use crate::cause_codes::{
    CategoryCodeDto, CauseCodeRegistry, DetailedCategoryCodeDto,
    ThirdCategoryCodeDto,
};
use crate::stations::{StationDto, StationRegistry};
use crate::TrainMetadata;
use anyhow::Context;
use serde::de::DeserializeOwned;
use shared_kernel::http_client::HttpClient;
use url::Url;

const STATIONS_PATH: &str = "stations";
const CATEGORY_CODES_PATH: &str = "cause-category-codes";
const DETAILED_CATEGORY_CODES_PATH: &str = "detailed-cause-category-codes";
const THIRD_CATEGORY_CODES_PATH: &str = "third-cause-category-codes";

pub struct MetadataLoader {
    host: Url,
}

impl MetadataLoader {
    pub fn new(host: Url) -> Self {
        Self { host }
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        let host = self.host.as_str().trim_end_matches('/');
        Url::parse(&format!("{host}/{path}"))
            .with_context(|| format!("Invalid metadata url for {path}"))
    }

    /// Fetches one metadata list. A failing endpoint yields an empty list so
    /// that lookups against it degrade instead of stopping the service.
    async fn fetch_or_empty<DTO: DeserializeOwned>(&self, path: &str) -> Vec<DTO> {
        let result = match self.endpoint(path) {
            Ok(url) => HttpClient::get_json::<Vec<DTO>>(url).await,
            Err(err) => Err(err),
        };
        result.unwrap_or_else(|err| {
            tracing::error!("Could not load metadata from {path}: {err:?}");
            vec![]
        })
    }

    #[tracing::instrument(skip(self), fields(host = %self.host), level = "info")]
    pub async fn load(&self) -> TrainMetadata {
        let (stations, categories, detailed, third) = futures::join!(
            self.fetch_or_empty::<StationDto>(STATIONS_PATH),
            self.fetch_or_empty::<CategoryCodeDto>(CATEGORY_CODES_PATH),
            self.fetch_or_empty::<DetailedCategoryCodeDto>(DETAILED_CATEGORY_CODES_PATH),
            self.fetch_or_empty::<ThirdCategoryCodeDto>(THIRD_CATEGORY_CODES_PATH),
        );
        tracing::info!(
            stations = stations.len(),
            categories = categories.len(),
            detailed = detailed.len(),
            third = third.len(),
            "Loaded train metadata"
        );

        let metadata = TrainMetadata {
            causes: CauseCodeRegistry::load(
                categories
                    .into_iter()
                    .filter_map(CategoryCodeDto::into_code_name)
                    .collect(),
                detailed
                    .into_iter()
                    .filter_map(DetailedCategoryCodeDto::into_code_name)
                    .collect(),
                third
                    .into_iter()
                    .filter_map(ThirdCategoryCodeDto::into_code_name)
                    .collect(),
            ),
            stations: StationRegistry::load(stations),
        };
        if metadata.stations.is_empty() {
            tracing::warn!("No station names loaded, alerts will show station codes");
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use crate::loader::MetadataLoader;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;
    use url::Url;

    #[tokio::test]
    async fn test_metadata_is_loaded_from_all_endpoints() {
        let server = MockServer::start_async().await;
        let stations = server
            .mock_async(|when, then| {
                when.method(GET).path("/metadata/stations");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([
                        { "stationShortCode": null, "stationName": "Nowhere" },
                        { "stationShortCode": "HKI", "stationName": "Helsinki asema" }
                    ]));
            })
            .await;
        let categories = server
            .mock_async(|when, then| {
                when.method(GET).path("/metadata/cause-category-codes");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([
                        { "categoryCode": null, "categoryName": "Broken" },
                        { "categoryCode": "H", "categoryName": "Weather" }
                    ]));
            })
            .await;
        let detailed = server
            .mock_async(|when, then| {
                when.method(GET).path("/metadata/detailed-cause-category-codes");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([
                        { "detailedCategoryCode": "H1", "detailedCategoryName": "Heavy snow" }
                    ]));
            })
            .await;
        let third = server
            .mock_async(|when, then| {
                when.method(GET).path("/metadata/third-cause-category-codes");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([]));
            })
            .await;

        let host = Url::parse(&server.url("/metadata")).unwrap();
        let metadata = MetadataLoader::new(host).load().await;

        stations.assert_async().await;
        categories.assert_async().await;
        detailed.assert_async().await;
        third.assert_async().await;
        assert_eq!(metadata.stations.name_for("HKI"), "Helsinki asema");
        assert_eq!(metadata.causes.resolve(&["H", "H1"][..]), "Weather : Heavy snow");
    }

    #[tokio::test]
    async fn test_invalid_payload_leaves_that_table_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/stations");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "not": "a list" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cause-category-codes");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([{ "categoryCode": "H", "categoryName": "Weather" }]));
            })
            .await;

        let host = Url::parse(&server.base_url()).unwrap();
        let metadata = MetadataLoader::new(host).load().await;

        assert!(metadata.stations.is_empty());
        assert_eq!(metadata.causes.resolve(&["H"][..]), "Weather");
    }
}
