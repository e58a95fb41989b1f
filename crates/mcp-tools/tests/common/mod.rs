pub mod mock_conference_api;
