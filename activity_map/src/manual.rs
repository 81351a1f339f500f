/*!

This is the long-form manual for `activity_map` and the `actmap` command line tool.

## Input files

Two spreadsheets are expected, in CSV or Excel (.xlsx) format:

* the **individuals** file: one row per person, with a name and a home address,
* the **activities** file: one row per activity, with its type, its name and the names of
  its facilitators.

Exports often start with a title, a date or a few blank lines. The header row is found by
looking for the first row containing at least two known column names (see below). If no row
qualifies, the first row is used and a warning is logged.

### Column names

Column names are compared without case, whitespace or underscores: `First Name`,
`first_name` and `FIRSTNAME` are the same column. When several accepted names are present,
the one listed first below wins.

Individuals:

| Field              | Accepted column names                                                   |
|--------------------|-------------------------------------------------------------------------|
| first name         | First Name, FirstName, first_name, Given Name, First                    |
| last name          | Last Name, LastName, last_name, Surname, Family Name, Last              |
| address line 1     | Address Line 1, Address1, address_line_1, Street Address, Street        |
| address line 2     | Address Line 2, Address2, address_line_2, Unit                          |
| address            | Address, Home Address, Full Address                                     |
| neighbourhood      | Focus Neighbourhood, Focus Neighborhood, Neighbourhood, Neighborhood    |
| postal code        | Postal Code, PostalCode, Postcode, Zip Code, Zip                        |
| locality           | Locality, City, Town                                                    |
| region             | Region, Province, State                                                 |
| national community | National Community, Country                                             |

The address lines, when present, take precedence over the combined address column.

Activities:

| Field          | Accepted column names                              |
|----------------|----------------------------------------------------|
| activity type  | Activity Type, ActivityType, Type                  |
| activity name  | Activity Name, ActivityName, Name, Activity        |
| facilitators   | Facilitators, Facilitator, Facilitator Names, Tutors |

### Activity types

| Type in the file     | Code |
|----------------------|------|
| Children's Class     | `CC` |
| Junior Youth Group   | `JY` |
| Study Circle         | `SC` |
| Devotional           | `DM` |

Rows with any other type are ignored.

### Facilitators

Facilitators are separated by semicolons: `Jane Doe; John Smith`. Each name is matched
against the "first last" name of the individuals, ignoring case and extra spaces.

* A row without facilitators is listed under *no facilitators*.
* A row whose facilitators are all unknown is listed under *facilitator not found*.
* A row with at least one known facilitator gets one marker per known facilitator, and is
  counted once for its type.

## Geocoding

Each distinct address (street, neighbourhood, postal code, locality, region, national
community) is geocoded once. Requests go through a token bucket (1000 requests per minute
by default). When no token is available, the request waits one second and tries again, at
most 3 more times. Addresses that cannot be resolved are counted and reported in a single
message; the people living there are left off the map.

## Marker layout

A facilitator running several activities gets one marker per activity, spread on a ring of
0.0005 degrees around their home. A single activity is drawn east of the home, so that it
never hides the home marker.

## Command line

```bash
actmap --individuals people.xlsx --activities activities.csv \
  --geocoder-table addresses.csv --out map.json
```

Options can also be given in a JSON configuration file passed with `--config`:

```json
{
  "individualsFile": "people.xlsx",
  "activitiesFile": "activities.csv",
  "geocoder": { "provider": "table", "tablePath": "addresses.csv" },
  "rateLimit": { "capacity": 1000, "windowSeconds": 60 },
  "retry": { "maxRetries": 3, "backoffMillis": 1000 },
  "layout": { "radius": 0.0005 },
  "outputFile": "map.json"
}
```

Paths in the configuration file are relative to the file itself. The `table` geocoder reads
a CSV file with the columns `query,lat,lng`. When built with the `http` feature, the `http`
provider queries a Google-style geocoding endpoint:

```json
{ "provider": "http", "endpoint": "https://maps.googleapis.com/maps/api/geocode/json",
  "apiKeyEnv": "GEOCODING_API_KEY" }
```

Pass `--verbose` (or set `RUST_LOG=debug`) to see every row as it is processed.
*/
